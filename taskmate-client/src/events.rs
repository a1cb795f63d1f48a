//! User-facing notifications
//!
//! Every settled create, edit, delete or complete produces one short
//! notification (the "toast"), as does a failed fetch. Presentation layers
//! consume them either through a channel subscription or a Rust callback.
//!
//! # Example
//!
//! ```rust,no_run
//! use taskmate_client::events::{Level, NotificationDispatcher};
//!
//! # async fn run() {
//! let dispatcher = NotificationDispatcher::new();
//! let mut toasts = dispatcher.subscribe();
//!
//! while let Some(toast) = toasts.recv().await {
//!     match toast.level {
//!         Level::Success => println!("{}", toast.message),
//!         Level::Error => eprintln!("{}", toast.message),
//!     }
//! }
//! # }
//! ```

use crate::state::TaskDelta;
use std::sync::Mutex;
use taskmate_core::{Operation, TaskError};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// The user action a notification reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fetch,
    Create,
    Edit,
    Delete,
    Complete,
}

impl Action {
    pub fn from_operation(operation: Operation) -> Self {
        match operation {
            Operation::Fetch => Action::Fetch,
            Operation::Create => Action::Create,
            Operation::Update => Action::Edit,
            Operation::Delete => Action::Delete,
            Operation::Complete => Action::Complete,
        }
    }

    /// Successful fetches are silent.
    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            Action::Fetch => None,
            Action::Create => Some("Successfully created task!"),
            Action::Edit => Some("Task updated!"),
            Action::Delete => Some("Task deleted!"),
            Action::Complete => Some("Task completed!"),
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::Fetch => "Failed to fetch tasks",
            Action::Create => "Failed to create task, try again!",
            Action::Edit => "Failed to update task!",
            Action::Delete => "Failed to delete task!",
            Action::Complete => "Failed to mark task as completed!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub action: Action,
    pub message: String,
    pub task_id: Option<String>,
}

impl Notification {
    pub fn from_delta(delta: &TaskDelta) -> Option<Self> {
        let action = Action::from_operation(delta.operation());
        action.success_message().map(|message| Notification {
            level: Level::Success,
            action,
            message: message.to_string(),
            task_id: delta.task_id().map(str::to_string),
        })
    }

    pub fn from_error(error: &TaskError, task_id: Option<&str>) -> Self {
        let action = Action::from_operation(error.operation);
        Notification {
            level: Level::Error,
            action,
            message: action.failure_message().to_string(),
            task_id: task_id.map(str::to_string),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

type Callback = Box<dyn Fn(&Notification) + Send + Sync>;

/// Fans notifications out to every subscriber and registered callback.
pub struct NotificationDispatcher {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Notification>>>,
    callbacks: Mutex<Vec<Callback>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Receive every notification emitted from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded_channel();
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(tx),
            Err(_) => tracing::error!("Failed to acquire subscriber lock"),
        }
        rx
    }

    /// Register a callback invoked synchronously for every notification.
    pub fn register_callback<F>(&self, callback: F)
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        match self.callbacks.lock() {
            Ok(mut callbacks) => callbacks.push(Box::new(callback)),
            Err(_) => tracing::error!("Failed to acquire callback lock"),
        }
    }

    pub fn emit(&self, notification: Notification) {
        match notification.level {
            Level::Success => tracing::info!("NOTIFY: {}", notification.message),
            Level::Error => tracing::warn!("NOTIFY: {}", notification.message),
        }

        match self.callbacks.lock() {
            Ok(callbacks) => {
                for callback in callbacks.iter() {
                    callback(&notification);
                }
            }
            Err(_) => tracing::error!("Failed to acquire callback lock for notification"),
        }

        match self.subscribers.lock() {
            // Closed receivers are dropped here.
            Ok(mut subscribers) => subscribers.retain(|tx| tx.send(notification.clone()).is_ok()),
            Err(_) => tracing::error!("Failed to acquire subscriber lock for notification"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
