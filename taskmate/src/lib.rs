//! Taskmate - task lists kept in a remote document collection
//!
//! This crate provides a unified API over the sync layer and the
//! application state store.
//!
//! # Example
//!
//! ```ignore
//! use taskmate::{App, MemoryStore, TaskDraft, TaskSync};
//!
//! let app = App::new(TaskSync::new(Arc::new(MemoryStore::new())));
//! app.load().await;
//! app.scope().create(TaskDraft::new("Grade essays", "Batch 3")).await;
//! ```

// Re-export client types
pub use taskmate_client::{
    App, BulkReport, Config, HttpStore, MemoryStore, Notification, NotificationDispatcher,
    Outcome, RemoteTaskStore, Scope, Store, TaskQuery, TaskState, TaskSync,
};

// Re-export core types that external applications may need
pub use taskmate_core::{
    FetchStatus, StoreError, Task, TaskDraft, TaskEdit, TaskError, TaskResult, TaskStatus,
};
