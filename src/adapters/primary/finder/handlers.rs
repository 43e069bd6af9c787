use std::convert::TryFrom;
use tracing::{instrument, warn};
use warp::{
    http::StatusCode,
    reject::Reject,
    reply::{json, with_header, with_status},
};

use crate::adapters::primary::finder::{
    api::{
        FinderStatus, NearestRequestBody, NearestResponseBody, RegionStatus, StatusResponseBody,
    },
    settings::Settings,
};
use crate::domain::{
    model::{error::Error as ModelError, query::LocationQuery},
    ports::primary::find_nearest::FindNearestChurches,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
pub const PREFLIGHT_MAX_AGE: u32 = 3600;

#[derive(Clone)]
pub struct Context<F> {
    pub finder: F,
    pub settings: Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorReason {
    InvalidInput,
    LocationNotFound,
    StoreError,
}

#[derive(Debug)]
pub struct RequestError {
    pub reason: RequestErrorReason,
    pub info: String,
}

impl Reject for RequestError {}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self.reason {
            RequestErrorReason::InvalidInput => StatusCode::BAD_REQUEST,
            RequestErrorReason::LocationNotFound => StatusCode::NOT_FOUND,
            RequestErrorReason::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ModelError> for RequestError {
    fn from(err: ModelError) -> Self {
        let reason = match err {
            ModelError::MissingInput | ModelError::InvalidCoordinates { .. } => {
                RequestErrorReason::InvalidInput
            }
            ModelError::NotFound { .. } => RequestErrorReason::LocationNotFound,
            ModelError::ChurchRetrieval { .. } => RequestErrorReason::StoreError,
        };
        RequestError {
            reason,
            info: err.to_string(),
        }
    }
}

#[instrument(skip(ctx))]
pub async fn nearest<F>(
    ctx: Context<F>,
    body: NearestRequestBody,
) -> Result<impl warp::Reply, warp::Rejection>
where
    F: FindNearestChurches,
{
    let query = LocationQuery::try_from(body).map_err(|err| {
        warn!("invalid request: {}", err);
        warp::reject::custom(RequestError::from(err))
    })?;

    let nearest = ctx
        .finder
        .find_nearest_churches(query)
        .await
        .map_err(|err| {
            warn!("could not find nearest churches: {}", err);
            warp::reject::custom(RequestError::from(err))
        })?;

    let resp = NearestResponseBody::from(nearest);
    Ok(with_status(json(&resp), StatusCode::OK))
}

pub async fn preflight() -> Result<impl warp::Reply, warp::Rejection> {
    let reply = with_status(warp::reply(), StatusCode::NO_CONTENT);
    let reply = with_header(reply, "access-control-allow-methods", ALLOWED_METHODS);
    let reply = with_header(reply, "access-control-allow-headers", ALLOWED_HEADERS);
    let reply = with_header(reply, "access-control-max-age", PREFLIGHT_MAX_AGE.to_string());
    Ok(reply)
}

pub async fn status<F>(ctx: Context<F>) -> Result<impl warp::Reply, warp::Rejection> {
    let region = &ctx.settings.region;
    let resp = StatusResponseBody {
        finder: FinderStatus {
            version: VERSION.to_string(),
        },
        region: RegionStatus {
            city: region.city.clone(),
            state: region.state.clone(),
            country: region.country.clone(),
            bbox: region.bbox.to_string(),
        },
    };
    Ok(with_status(json(&resp), StatusCode::OK))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_model_errors_to_status_codes() {
        let status = |err: ModelError| RequestError::from(err).status();
        assert_eq!(status(ModelError::MissingInput), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(ModelError::InvalidCoordinates {
                details: String::from("lat out of range")
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ModelError::NotFound {
                query: String::from("Rua X")
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(ModelError::ChurchRetrieval {
                source: "permission denied".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn should_keep_the_error_message() {
        let err = RequestError::from(ModelError::MissingInput);
        assert_eq!(err.info, "Provide 'address'/'cep' or both 'lat' and 'lon'");
    }
}
