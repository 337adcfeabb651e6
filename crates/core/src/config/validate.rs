use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Store table name and timeouts are usable
/// - Retrieval timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Store validation
    if config.store.table.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "store.table cannot be empty".to_string(),
        ));
    }
    if config.store.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "store.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Orchestrator validation
    if config.orchestrator.retrieval_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.retrieval_timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::net::IpAddr;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_table_fails() {
        let mut config = Config::default();
        config.store.table = " ".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_retrieval_timeout_fails() {
        let mut config = Config::default();
        config.orchestrator.retrieval_timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("retrieval_timeout_secs"));
    }
}
