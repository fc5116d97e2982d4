use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Environment variable naming the TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "TRANSMUTE_CONFIG";

const ENV_PREFIX: &str = "TRANSMUTE_";

/// Configuration file path from `TRANSMUTE_CONFIG`, if set.
pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Load configuration: defaults, then the optional file, then environment overrides.
///
/// Environment keys use a double underscore between section and key,
/// e.g. `TRANSMUTE_SERVER__PORT=8080` or `TRANSMUTE_CONVERTER__FFMPEG_PATH=/usr/bin/ffmpeg`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
