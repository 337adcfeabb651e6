use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::orchestrator::OrchestratorConfig;
use crate::retriever::RetrieverConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub retriever: RetrieverConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8000
}

/// Task store (Supabase / PostgREST) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Project URL (e.g., "https://xyz.supabase.co")
    #[serde(default)]
    pub url: String,
    /// Service role key, sent as both `apikey` and bearer token
    #[serde(default)]
    pub service_role_key: String,
    /// Table holding task records
    #[serde(default = "default_table")]
    pub table: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_role_key: String::new(),
            table: default_table(),
            timeout_secs: default_store_timeout(),
        }
    }
}

fn default_table() -> String {
    "download_tasks".to_string()
}

fn default_store_timeout() -> u32 {
    10
}

/// Sanitized config for API responses and logs (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub store: SanitizedStoreConfig,
    pub retriever: SanitizedRetrieverConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Sanitized store config (service role key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStoreConfig {
    pub url: String,
    pub service_role_key_configured: bool,
    pub table: String,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRetrieverConfig {
    pub ytdlp_path: PathBuf,
    pub output_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            store: SanitizedStoreConfig {
                url: config.store.url.clone(),
                service_role_key_configured: !config.store.service_role_key.is_empty(),
                table: config.store.table.clone(),
                timeout_secs: config.store.timeout_secs,
            },
            retriever: SanitizedRetrieverConfig {
                ytdlp_path: config.retriever.ytdlp_path.clone(),
                output_dir: config.retriever.output_dir.clone(),
                public_base_url: config.retriever.public_base_url.clone(),
            },
            orchestrator: config.orchestrator.clone(),
        }
    }
}
