use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for structured environment overrides (`VIDFETCH_SERVER__PORT=9000`).
const ENV_PREFIX: &str = "VIDFETCH_";

/// Load configuration from an optional TOML file with environment variable overrides.
///
/// Besides the prefixed variables, the conventional deployment variables
/// `HOST`, `PORT`, `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY` are honored.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment
        .merge(
            Env::raw()
                .only(&["HOST", "PORT"])
                .map(|key| format!("server.{}", key.as_str().to_ascii_lowercase()).into()),
        )
        .merge(
            Env::raw()
                .only(&["SUPABASE_URL", "SUPABASE_SERVICE_ROLE_KEY"])
                .map(|key| {
                    if key.as_str().eq_ignore_ascii_case("SUPABASE_URL") {
                        "store.url".into()
                    } else {
                        "store.service_role_key".into()
                    }
                }),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
