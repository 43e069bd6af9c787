//! Command line arguments and configuration of the finder service.
use clap::{Parser, Subcommand};
use config::{builder::DefaultState, ConfigBuilder};
use snafu::{ensure, ResultExt, Snafu};
use std::convert::TryFrom;
use std::env;
use std::path::PathBuf;

use churchfinder::adapters::primary::finder::settings::Settings;
use churchfinder::utils::config::{config_builder_from, config_from_args, Error as ConfigError};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Config Compilation Error: {}", source))]
    ConfigCompilation { source: ConfigError },

    #[snafu(display("Config Merge Error: {} [{}]", msg, source))]
    ConfigMerge {
        msg: String,
        source: config::ConfigError,
    },

    #[snafu(display("Missing Google Maps API key, set GOOGLE_MAPS_API_KEY"))]
    MissingApiKey,
}

#[derive(Debug, Parser)]
#[command(
    name = "finder",
    about = "REST API returning the churches nearest to a location",
    version = VERSION,
    author = AUTHORS
)]
pub struct Opts {
    /// Defines the config directory
    ///
    /// This directory must contain 'finder' and 'region' subdirectories.
    #[arg(short = 'c', long = "config-dir")]
    pub config_dir: PathBuf,

    /// Defines the run mode in {testing, dev, prod, ...}
    ///
    /// If no run mode is provided, only the default configuration is used.
    #[arg(short = 'm', long = "run-mode")]
    pub run_mode: Option<String>,

    /// Override settings values using key=value
    #[arg(short = 's', long = "setting")]
    pub settings: Vec<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the finder web service
    Run,
    /// Prints the finder's configuration
    Config,
}

// Environment variables understood without the FINDER prefix, as they are
// the ones set by the hosting platform.
const ENV_OVERRIDES: [(&str, &str); 5] = [
    ("GOOGLE_MAPS_API_KEY", "google.api_key"),
    ("GOOGLE_CLOUD_PROJECT", "firestore.project"),
    ("FIRESTORE_COLLECTION", "firestore.collection"),
    ("FIRESTORE_DATABASE", "firestore.database"),
    ("REGION_BBOX", "region.bbox"),
];

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}

fn set_override(
    builder: ConfigBuilder<DefaultState>,
    key: &str,
    value: String,
) -> Result<ConfigBuilder<DefaultState>, Error> {
    builder.set_override(key, value).context(ConfigMergeSnafu {
        msg: format!("Could not set {} from environment variable", key),
    })
}

fn with_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, Error> {
    for (var, key) in ENV_OVERRIDES {
        if let Some(value) = non_empty_var(var) {
            builder = set_override(builder, key, value)?;
        }
    }

    // The bounding box can also be given as two 'lat,lon' corners.
    if non_empty_var("REGION_BBOX").is_none() {
        if let (Some(sw), Some(ne)) = (
            non_empty_var("REGION_BBOX_SW"),
            non_empty_var("REGION_BBOX_NE"),
        ) {
            builder = set_override(builder, "region.bbox", format!("{};{}", sw, ne))?;
        }
    }

    if let Some(token) = non_empty_var("FIRESTORE_ACCESS_TOKEN") {
        builder = set_override(builder, "firestore.access_token", token)?;
        builder = set_override(builder, "firestore.token_source", String::from("static"))?;
    }

    if let Some(host) = non_empty_var("FIRESTORE_EMULATOR_HOST") {
        builder = set_override(builder, "firestore.url", format!("http://{}/v1/", host))?;
        builder = set_override(builder, "firestore.token_source", String::from("none"))?;
    }

    Ok(builder)
}

impl TryFrom<&Opts> for Settings {
    type Error = Error;

    // Read <config-dir>/finder and <config-dir>/region, then the command
    // line overrides, then the platform environment variables.
    fn try_from(opts: &Opts) -> Result<Self, Self::Error> {
        let mut builder = config_builder_from(
            &opts.config_dir,
            &["finder", "region"],
            opts.run_mode.clone(),
            "FINDER",
        );

        builder = builder
            .add_source(config_from_args(opts.settings.clone()).context(ConfigCompilationSnafu)?);

        builder = with_env_overrides(builder)?;

        let config = builder.build().context(ConfigMergeSnafu {
            msg: String::from("Cannot build the configuration from sources"),
        })?;

        let settings: Settings = config.try_deserialize().context(ConfigMergeSnafu {
            msg: String::from("Cannot convert configuration into finder settings"),
        })?;

        ensure!(!settings.google.api_key.trim().is_empty(), MissingApiKeySnafu);
        Ok(settings)
    }
}
