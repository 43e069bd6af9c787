use snafu::{ResultExt, Snafu};
use std::convert::TryInto;
use std::net::ToSocketAddrs;
use tokio::runtime;
use tracing::{info, instrument};
use warp::Filter;

use super::settings::{Error as SettingsError, Opts};
use churchfinder::adapters::primary::finder::{handlers::Context, routes, settings::Settings};
use churchfinder::adapters::secondary::{
    firestore::{Error as FirestoreError, FirestoreStore},
    google::{Error as GoogleError, GoogleGeocoder},
};
use churchfinder::domain::usecases::find_nearest::FindNearest;
use churchfinder::utils::logger::{logger_init, Error as LoggerError};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not generate settings: {}", source))]
    SettingsProcessing { source: SettingsError },

    #[snafu(display("Could not create the geocoding client: {}", source))]
    GeocoderClient { source: GoogleError },

    #[snafu(display("Could not create the Firestore client: {}", source))]
    StoreClient { source: FirestoreError },

    #[snafu(display("Could not build the tokio runtime: {}", source))]
    Runtime { source: std::io::Error },

    #[snafu(display("Socket Addr Error with host {} / port {}: {}", host, port, source))]
    SockAddr {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    #[snafu(display("Addr Resolution Error {}", msg))]
    AddrResolution { msg: String },

    #[snafu(display("Could not init logger: {}", source))]
    InitLog { source: LoggerError },

    #[snafu(display("Could not serialize settings: {}", source))]
    SettingsDisplay { source: serde_json::Error },
}

pub fn run(opts: &Opts) -> Result<(), Error> {
    let settings: Settings = opts.try_into().context(SettingsProcessingSnafu)?;
    let _log_guard = logger_init(settings.logging.path.clone()).context(InitLogSnafu)?;

    let runtime = runtime::Builder::new_multi_thread()
        .worker_threads(settings.nb_threads.unwrap_or_else(num_cpus::get))
        .enable_all()
        .build()
        .context(RuntimeSnafu)?;

    runtime.block_on(run_server(settings))
}

pub fn config(opts: &Opts) -> Result<(), Error> {
    let settings: Settings = opts.try_into().context(SettingsProcessingSnafu)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&settings).context(SettingsDisplaySnafu)?
    );
    Ok(())
}

#[instrument(skip(settings))]
pub async fn run_server(settings: Settings) -> Result<(), Error> {
    info!(
        "Geocoding with {} and reading churches from {}",
        &settings.google.url, &settings.firestore.url
    );

    let geocoder = GoogleGeocoder::new(settings.google.clone()).context(GeocoderClientSnafu)?;
    let store = FirestoreStore::new(settings.firestore.clone()).context(StoreClientSnafu)?;
    let finder = FindNearest::new(geocoder, store, settings.region_settings());

    // Settings are read once, every request gets a clone of the same context.
    let ctx = Context {
        finder,
        settings: settings.clone(),
    };

    let api = routes::api(ctx).with(warp::trace(|info| {
        tracing::info_span!(
            "request",
            method = %info.method(),
            path = %info.path(),
        )
    }));

    info!("api ready");

    let host = settings.service.host;
    let port = settings.service.port;
    let addr = (host.as_str(), port);
    let addr = addr
        .to_socket_addrs()
        .context(SockAddrSnafu { host: host.clone(), port })?
        .next()
        .ok_or(Error::AddrResolution {
            msg: String::from("Cannot resolve finder addr."),
        })?;

    info!("Serving finder on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
