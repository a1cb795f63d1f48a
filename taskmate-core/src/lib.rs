pub mod document;
pub mod errors;
pub mod models;
pub mod patches;

pub use document::*;
pub use errors::*;
pub use models::*;
pub use patches::*;

/// Collection holding task documents in the remote store.
pub const DEFAULT_COLLECTION: &str = "Tasks";

pub type TaskResult<T> = Result<T, TaskError>;
