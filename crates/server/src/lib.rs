pub mod api;
pub mod metrics;
pub mod state;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name reported by the informational endpoints
pub const SERVICE_NAME: &str = "vidfetch";
