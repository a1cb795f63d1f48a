use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use taskmate_client::{App, MemoryStore, Notification, TaskSync};
use taskmate_core::{TaskDocument, TaskStatus, Timestamp, DEFAULT_COLLECTION};
use tokio::sync::mpsc::UnboundedReceiver;

/// Creates an empty in-memory remote store.
#[allow(dead_code)]
pub fn setup_remote() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Creates an application over a fresh in-memory remote store.
#[allow(dead_code)]
pub fn setup_app() -> (Arc<MemoryStore>, App<MemoryStore>) {
    let remote = setup_remote();
    let app = App::new(TaskSync::new(remote.clone()));
    (remote, app)
}

/// Midnight UTC on the given day.
#[allow(dead_code)]
pub fn day(year: i32, month: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, d, 0, 0, 0).unwrap()
}

/// Builds a remote task document.
#[allow(dead_code)]
pub fn make_document(title: &str, status: TaskStatus, date: Option<DateTime<Utc>>) -> TaskDocument {
    TaskDocument {
        title: title.to_string(),
        description: format!("{} description", title),
        date: date.map(Timestamp::from),
        status: status.as_str().to_string(),
    }
}

/// Seeds pending tasks with fixed ids into the default collection.
#[allow(dead_code)]
pub async fn seed_pending(remote: &MemoryStore, ids: &[&str]) {
    for id in ids {
        remote
            .insert(
                DEFAULT_COLLECTION,
                id,
                make_document(&format!("Task {}", id), TaskStatus::Pending, None),
            )
            .await;
    }
}

/// Collects every notification already delivered to `rx`.
#[allow(dead_code)]
pub fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut received = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        received.push(notification);
    }
    received
}

#[allow(dead_code)]
pub fn ids(app: &App<MemoryStore>) -> Vec<String> {
    app.store()
        .snapshot()
        .list
        .iter()
        .map(|task| task.id.clone())
        .collect()
}
