//! Task store client.
//!
//! The store is a key-addressed record keeper for task status, reached over
//! the network. Writes are partial-field updates keyed by `task_id`. From the
//! orchestrator's point of view every write is best-effort.

mod error;
mod supabase;
mod traits;

pub use error::StoreError;
pub use supabase::SupabaseTaskStore;
pub use traits::TaskStore;
