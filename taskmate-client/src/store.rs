use crate::state::{reduce, TaskEvent, TaskState};
use taskmate_core::FetchStatus;
use tokio::sync::watch;

/// State container owned by the application root.
///
/// The only way to change the state is [`Store::dispatch`]; readers take a
/// snapshot or subscribe to be woken whenever a new state is committed.
pub struct Store {
    tx: watch::Sender<TaskState>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(TaskState::default())
    }

    pub fn with_state(state: TaskState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { tx }
    }

    pub fn dispatch(&self, event: TaskEvent) {
        tracing::debug!("STORE: dispatch {:?}", event);
        self.tx.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, &event);
        });
    }

    pub fn snapshot(&self) -> TaskState {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.tx.borrow().status
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.tx.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
