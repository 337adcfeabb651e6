pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod retriever;
pub mod store;
pub mod task;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    ServerConfig, StoreConfig,
};
pub use orchestrator::{
    CompletedDownload, DownloadOrchestrator, DuplicatePolicy, OrchestratorConfig,
    OrchestratorError, OrchestratorStatus,
};
pub use retriever::{
    Artifact, RetrievalError, RetrievalRequest, Retriever, RetrieverConfig, YtDlpRetriever,
};
pub use store::{StoreError, SupabaseTaskStore, TaskStore};
pub use task::{
    DownloadKind, DownloadRequest, DownloadTask, TaskStatus, TaskTransition, TaskUpdate,
    ValidationError,
};
