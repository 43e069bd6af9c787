use std::convert::Infallible;
use warp::{
    http::StatusCode,
    hyper::body::Bytes,
    reject::{LengthRequired, MethodNotAllowed, PayloadTooLarge},
    Filter, Rejection, Reply,
};

use crate::adapters::primary::finder::{
    api::{ErrorBody, NearestRequestBody},
    handlers::{self, Context, RequestError},
};
use crate::domain::ports::primary::find_nearest::FindNearestChurches;

pub fn with_context<F>(
    ctx: Context<F>,
) -> impl Filter<Extract = (Context<F>,), Error = Infallible> + Clone
where
    F: Clone + Send + Sync,
{
    warp::any().map(move || ctx.clone())
}

/// Extracts the request body, a malformed or non object JSON body is read
/// as an empty request.
pub fn lenient_body(
    content_length_limit: u64,
) -> impl Filter<Extract = (NearestRequestBody,), Error = Rejection> + Clone {
    warp::body::content_length_limit(content_length_limit)
        .and(warp::body::bytes())
        .map(|bytes: Bytes| {
            serde_json::from_slice::<NearestRequestBody>(&bytes).unwrap_or_else(|err| {
                tracing::debug!("unreadable body, using an empty request: {}", err);
                NearestRequestBody::default()
            })
        })
}

pub fn nearest<F>(
    ctx: Context<F>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    F: FindNearestChurches + Clone + 'static,
{
    let limit = ctx.settings.service.content_length_limit;
    warp::path!("api" / "v1" / "nearest")
        .and(warp::post())
        .and(with_context(ctx))
        .and(lenient_body(limit))
        .and_then(handlers::nearest)
}

pub fn preflight() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "v1" / "nearest")
        .and(warp::options())
        .and_then(handlers::preflight)
}

pub fn status<F>(ctx: Context<F>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    F: Clone + Send + Sync + 'static,
{
    warp::path!("api" / "v1" / "status")
        .and(warp::get())
        .and(with_context(ctx))
        .and_then(handlers::status)
}

/// The whole API, every reply carrying the CORS allowed origin.
pub fn api<F>(ctx: Context<F>) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone
where
    F: FindNearestChurches + Clone + 'static,
{
    nearest(ctx.clone())
        .or(preflight())
        .or(status(ctx))
        .recover(report_invalid)
        .with(warp::reply::with::header(
            "access-control-allow-origin",
            "*",
        ))
}

fn error_reply(message: &str, status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            error: message.to_string(),
        }),
        status,
    )
}

pub async fn report_invalid(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let reply = if let Some(err) = rejection.find::<RequestError>() {
        error_reply(&err.info, err.status())
    } else if let Some(err) = rejection.find::<PayloadTooLarge>() {
        tracing::warn!("Payload too large {:?}", err);
        error_reply("payload too large", StatusCode::PAYLOAD_TOO_LARGE)
    } else if let Some(err) = rejection.find::<LengthRequired>() {
        tracing::warn!("Length required {:?}", err);
        error_reply("content length required", StatusCode::LENGTH_REQUIRED)
    } else if let Some(err) = rejection.find::<MethodNotAllowed>() {
        tracing::warn!("MethodNotAllowed {:?}", err);
        error_reply("method not allowed", StatusCode::METHOD_NOT_ALLOWED)
    } else if rejection.is_not_found() {
        error_reply("not found", StatusCode::NOT_FOUND)
    } else {
        tracing::warn!("Internal server error {:?}", rejection);
        error_reply("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    };
    Ok(reply)
}
