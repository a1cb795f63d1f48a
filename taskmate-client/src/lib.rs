pub mod app;
pub mod config;
pub mod events;
pub mod http;
pub mod logging;
pub mod memory;
pub mod remote;
pub mod state;
pub mod store;
pub mod sync;
pub mod view;

pub use app::{App, BulkReport, Outcome, Scope};
pub use config::{Backend, Config, ConfigError};
pub use events::{Action, Level, Notification, NotificationDispatcher};
pub use http::HttpStore;
pub use logging::init_logging;
pub use memory::{MemoryStore, StoreOp};
pub use remote::RemoteTaskStore;
pub use state::{reduce, TaskDelta, TaskEvent, TaskState};
pub use store::Store;
pub use sync::{ReadBackPolicy, TaskSync};
pub use view::{format_due_date, DueIn, SortKey, SortOrder, TaskQuery};
