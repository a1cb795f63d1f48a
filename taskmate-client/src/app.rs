//! Application root.
//!
//! [`App`] wires the sync layer, the state [`Store`] and the notification
//! dispatcher together. Every finished remote operation is applied to the
//! store first and announced second. Work started from a [`Scope`] is
//! abandoned when the scope goes away: its result never reaches the store
//! and no notification is emitted.

use crate::events::{Notification, NotificationDispatcher};
use crate::remote::RemoteTaskStore;
use crate::state::{TaskDelta, TaskEvent};
use crate::store::Store;
use crate::sync::TaskSync;
use futures_util::future::join_all;
use std::future::Future;
use std::sync::Arc;
use taskmate_core::{FetchStatus, TaskDraft, TaskEdit, TaskError};
use tokio_util::sync::CancellationToken;

/// How a single operation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied(TaskDelta),
    Failed(TaskError),
    /// The owning scope was cancelled before the remote call settled.
    Cancelled,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn error(&self) -> Option<&TaskError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Per-id results of a bulk action. Ids keep their input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, TaskError)>,
    pub cancelled: Vec<String>,
}

impl BulkReport {
    fn record(&mut self, id: String, outcome: Outcome) {
        match outcome {
            Outcome::Applied(_) => self.succeeded.push(id),
            Outcome::Failed(e) => self.failed.push((id, e)),
            Outcome::Cancelled => self.cancelled.push(id),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }
}

struct Wiring<S: RemoteTaskStore + ?Sized> {
    store: Arc<Store>,
    sync: TaskSync<S>,
    notifications: Arc<NotificationDispatcher>,
}

impl<S: RemoteTaskStore + ?Sized> Clone for Wiring<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            sync: self.sync.clone(),
            notifications: self.notifications.clone(),
        }
    }
}

impl<S: RemoteTaskStore + ?Sized> Wiring<S> {
    /// Race `operation` against `token`; apply and announce the result if it wins.
    async fn settle<F>(
        &self,
        token: &CancellationToken,
        task_id: Option<&str>,
        operation: F,
    ) -> Outcome
    where
        F: Future<Output = Result<TaskDelta, TaskError>>,
    {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("APP: operation on {} abandoned", task_id.unwrap_or("<all>"));
                return Outcome::Cancelled;
            }
            result = operation => result,
        };

        self.store.dispatch(TaskEvent::from(result.clone()));

        match result {
            Ok(delta) => {
                if let Some(notification) = Notification::from_delta(&delta) {
                    self.notifications.emit(notification);
                }
                Outcome::Applied(delta)
            }
            Err(e) => {
                self.notifications.emit(Notification::from_error(&e, task_id));
                Outcome::Failed(e)
            }
        }
    }

    async fn fetch(&self, token: &CancellationToken) -> Outcome {
        if token.is_cancelled() {
            return Outcome::Cancelled;
        }
        let previous = self.store.status();
        self.store.dispatch(TaskEvent::FetchRequested);
        let outcome = self
            .settle(token, None, async {
                self.sync.fetch_all().await.map(TaskDelta::Loaded)
            })
            .await;

        if outcome.is_cancelled() {
            self.store.dispatch(TaskEvent::FetchCancelled(previous));
        }
        outcome
    }
}

pub struct App<S: RemoteTaskStore + ?Sized> {
    wiring: Wiring<S>,
    root: CancellationToken,
}

impl<S: RemoteTaskStore + ?Sized> App<S> {
    pub fn new(sync: TaskSync<S>) -> Self {
        Self::with_store(sync, Arc::new(Store::new()))
    }

    pub fn with_store(sync: TaskSync<S>, store: Arc<Store>) -> Self {
        Self {
            wiring: Wiring {
                store,
                sync,
                notifications: Arc::new(NotificationDispatcher::new()),
            },
            root: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.wiring.store
    }

    pub fn notifications(&self) -> &Arc<NotificationDispatcher> {
        &self.wiring.notifications
    }

    pub fn sync(&self) -> &TaskSync<S> {
        &self.wiring.sync
    }

    /// Initial load: fetches only while nothing has been requested yet.
    /// Returns `None` when the fetch was skipped.
    pub async fn load(&self) -> Option<Outcome> {
        if self.wiring.store.status() != FetchStatus::Idle {
            tracing::debug!("APP: load skipped, status is {:?}", self.wiring.store.status());
            return None;
        }
        Some(self.wiring.fetch(&self.root).await)
    }

    pub async fn refresh(&self) -> Outcome {
        self.wiring.fetch(&self.root).await
    }

    /// A new cancellation scope, e.g. for one open view.
    pub fn scope(&self) -> Scope<S> {
        Scope {
            wiring: self.wiring.clone(),
            token: self.root.child_token(),
        }
    }

    /// Cancel every scope and any in-flight root fetch.
    pub fn shutdown(&self) {
        tracing::info!("APP: shutting down");
        self.root.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}

/// Lifetime of a group of operations. Dropping it cancels whatever is still
/// in flight.
pub struct Scope<S: RemoteTaskStore + ?Sized> {
    wiring: Wiring<S>,
    token: CancellationToken,
}

impl<S: RemoteTaskStore + ?Sized> Scope<S> {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A handle that cancels this scope from elsewhere, e.g. a signal handler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub async fn refresh(&self) -> Outcome {
        self.wiring.fetch(&self.token).await
    }

    pub async fn create(&self, draft: TaskDraft) -> Outcome {
        let sync = &self.wiring.sync;
        self.wiring
            .settle(&self.token, None, async {
                sync.create(draft).await.map(TaskDelta::Created)
            })
            .await
    }

    pub async fn edit(&self, edit: TaskEdit) -> Outcome {
        let sync = &self.wiring.sync;
        let id = edit.id.clone();
        self.wiring
            .settle(&self.token, Some(&id), async {
                sync.update(edit).await.map(TaskDelta::Updated)
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Outcome {
        let sync = &self.wiring.sync;
        self.wiring
            .settle(&self.token, Some(id), async {
                sync.delete(id).await.map(TaskDelta::Deleted)
            })
            .await
    }

    pub async fn complete(&self, id: &str) -> Outcome {
        let sync = &self.wiring.sync;
        self.wiring
            .settle(&self.token, Some(id), async {
                sync.complete(id).await.map(TaskDelta::Completed)
            })
            .await
    }

    /// Delete every id concurrently. Each id settles on its own; there is no rollback.
    pub async fn delete_selected(&self, ids: &[String]) -> BulkReport {
        tracing::info!("APP: deleting {} selected tasks", ids.len());
        let outcomes = join_all(ids.iter().map(|id| self.delete(id))).await;
        collect_report(ids, outcomes)
    }

    pub async fn complete_selected(&self, ids: &[String]) -> BulkReport {
        tracing::info!("APP: completing {} selected tasks", ids.len());
        let outcomes = join_all(ids.iter().map(|id| self.complete(id))).await;
        collect_report(ids, outcomes)
    }
}

impl<S: RemoteTaskStore + ?Sized> Drop for Scope<S> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn collect_report(ids: &[String], outcomes: Vec<Outcome>) -> BulkReport {
    let mut report = BulkReport::default();
    for (id, outcome) in ids.iter().zip(outcomes) {
        report.record(id.clone(), outcome);
    }
    report
}
