use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use snafu::{ResultExt, Snafu};
use std::env;
use std::path::Path;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Key Value Splitting Error: {}", msg))]
    Splitting { msg: String },

    #[snafu(display("Setting Config Value Error: {}", source))]
    ConfigValue { source: config::ConfigError },

    #[snafu(display("Config Compilation Error: {}", source))]
    ConfigCompilation { source: config::ConfigError },
}

// Layers, from lowest to highest priority, for each sub directory:
// * '<sub_dir>/default.toml'
// * '<sub_dir>/<run_mode>.toml', where the RUN_MODE environment variable
//   wins over the run mode given as argument. Required in the first sub
//   directory when a run mode is set, optional in the others.
// * '<sub_dir>/local.toml', optional, not meant to be checked in.
// Then environment variables with the given prefix, using '__' to separate
// nested keys, eg FINDER_SERVICE__PORT=8080 sets 'service.port'.
pub fn config_builder_from<T: Into<Option<String>> + Clone>(
    config_dir: &Path,
    sub_dirs: &[&str],
    run_mode: T,
    prefix: &str,
) -> ConfigBuilder<DefaultState> {
    let builder = sub_dirs
        .iter()
        .enumerate()
        .fold(Config::builder(), |mut builder, (index, sub_dir)| {
            let dir_path = config_dir.join(sub_dir);

            let default_path = dir_path.join("default").with_extension("toml");
            builder = builder.add_source(File::from(default_path));

            if let Some(run_mode) = env::var("RUN_MODE")
                .ok()
                .or_else(|| run_mode.clone().into())
            {
                let run_mode_path = dir_path.join(&run_mode).with_extension("toml");
                builder = builder.add_source(File::from(run_mode_path).required(index == 0));
            }

            let local_path = dir_path.join("local").with_extension("toml");
            builder = builder.add_source(File::from(local_path).required(false));
            builder
        });

    builder.add_source(
        Environment::with_prefix(prefix)
            .prefix_separator("_")
            .separator("__"),
    )
}

/// Create a new configuration source from a list of assignments key=value
///
/// The function iterates over the list, and for each element, it tries to
/// (a) identify the key and the value, by searching for the '=' sign.
/// (b) parse the value into one of bool, i64, f64. if not it's a string.
pub fn config_from_args(args: impl IntoIterator<Item = String>) -> Result<Config, Error> {
    let mut config = Config::builder();

    for arg in args {
        let (key, val) = arg.split_once('=').ok_or(Error::Splitting {
            msg: format!("missing '=' in setting override: {}", arg),
        })?;

        config = {
            if let Ok(as_bool) = val.parse::<bool>() {
                config.set_override(key, as_bool).context(ConfigValueSnafu)
            } else if let Ok(as_int) = val.parse::<i64>() {
                config.set_override(key, as_int).context(ConfigValueSnafu)
            } else if let Ok(as_float) = val.parse::<f64>() {
                config.set_override(key, as_float).context(ConfigValueSnafu)
            } else {
                config.set_override(key, val).context(ConfigValueSnafu)
            }
        }?
    }

    config.build().context(ConfigCompilationSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_typed_overrides() {
        let config = config_from_args(vec![
            String::from("service.port=8080"),
            String::from("google.language=pt-BR"),
            String::from("firestore.enabled=true"),
        ])
        .unwrap();
        assert_eq!(config.get_int("service.port").unwrap(), 8080);
        assert_eq!(config.get_string("google.language").unwrap(), "pt-BR");
        assert!(config.get_bool("firestore.enabled").unwrap());
    }

    #[test]
    fn should_reject_override_without_equal_sign() {
        let res = config_from_args(vec![String::from("service.port")]);
        assert!(matches!(res, Err(Error::Splitting { .. })));
    }
}
