//! Task synchronisation layer.
//!
//! Each operation performs its remote calls and normalises the outcome into a
//! [`TaskResult`]. Nothing here touches local state: applying a successful
//! result to the [`crate::Store`] is the caller's explicit second step.

use crate::remote::RemoteTaskStore;
use backon::{ExponentialBuilder, Retryable};
use std::sync::Arc;
use std::time::Duration;
use taskmate_core::{
    FieldPatch, StoreError, StoredDocument, Task, TaskDocument, TaskDraft, TaskEdit, TaskError,
    TaskResult, TaskStatus, DEFAULT_COLLECTION,
};

/// How hard `create` tries to read back the document it just wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadBackPolicy {
    /// Total reads, including the first one. Values below 1 are treated as 1.
    pub attempts: usize,
    pub base_delay: Duration,
}

impl Default for ReadBackPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }
}

pub struct TaskSync<S: RemoteTaskStore + ?Sized> {
    store: Arc<S>,
    collection: String,
    read_back: ReadBackPolicy,
}

impl<S: RemoteTaskStore + ?Sized> Clone for TaskSync<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            collection: self.collection.clone(),
            read_back: self.read_back,
        }
    }
}

impl<S: RemoteTaskStore + ?Sized> TaskSync<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            collection: DEFAULT_COLLECTION.to_string(),
            read_back: ReadBackPolicy::default(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_read_back(mut self, policy: ReadBackPolicy) -> Self {
        self.read_back = policy;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// All tasks in the collection, in the store's enumeration order.
    pub async fn fetch_all(&self) -> TaskResult<Vec<Task>> {
        match self.store.list(&self.collection).await {
            Ok(documents) => {
                let tasks: Vec<Task> = documents
                    .into_iter()
                    .map(StoredDocument::into_task)
                    .collect();
                tracing::info!("SYNC {}: Fetched {} tasks", self.collection, tasks.len());
                Ok(tasks)
            }
            Err(e) => {
                tracing::error!("SYNC {}: Error fetching tasks: {}", self.collection, e);
                Err(TaskError::fetch(e))
            }
        }
    }

    /// Write a new pending task and return it with its store-assigned id.
    ///
    /// The new document is read back to confirm the id. A read-back that keeps
    /// finding nothing fails the create with [`StoreError::ReadBackMissing`]
    /// even though the remote write happened; the next fetch picks it up.
    pub async fn create(&self, draft: TaskDraft) -> TaskResult<Task> {
        let document = TaskDocument::from_draft(&draft);

        let id = match self.store.add(&self.collection, document).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("SYNC {}: Error adding document: {}", self.collection, e);
                return Err(TaskError::create(e));
            }
        };
        tracing::info!("SYNC {}: Document {} added", self.collection, id);

        match self.read_back(&id).await {
            Ok(stored) => {
                let task = stored.into_task();
                tracing::info!("SYNC {}: Created task {}", self.collection, task.id);
                Ok(task)
            }
            Err(e) => {
                tracing::error!(
                    "SYNC {}: Created document {} but read-back failed: {}",
                    self.collection,
                    id,
                    e
                );
                Err(TaskError::create(e))
            }
        }
    }

    async fn read_back(&self, id: &str) -> Result<StoredDocument, StoreError> {
        let store = &self.store;
        let collection = self.collection.as_str();
        let retries = self.read_back.attempts.max(1) - 1;

        let read = move || async move {
            store
                .get(collection, id)
                .await?
                .ok_or_else(|| StoreError::ReadBackMissing(id.to_string()))
        };

        read.retry(
            ExponentialBuilder::default()
                .with_min_delay(self.read_back.base_delay)
                .with_max_times(retries),
        )
        .when(|e| matches!(e, StoreError::ReadBackMissing(_)))
        .notify(|e, delay| {
            tracing::warn!(
                "SYNC {}: {}; retrying read-back in {:?}",
                collection,
                e,
                delay
            );
        })
        .await
    }

    /// Overwrite title, description and date of an existing task. Status is left alone.
    ///
    /// This is a patch, not a full [`RemoteTaskStore::set`]: a task deleted
    /// remotely in the meantime is not recreated, and the update fails with
    /// `NotFound` tagged [`Operation::Update`](taskmate_core::Operation::Update).
    pub async fn update(&self, edit: TaskEdit) -> TaskResult<TaskEdit> {
        match self
            .store
            .patch(&self.collection, &edit.id, FieldPatch::edit(&edit))
            .await
        {
            Ok(()) => {
                tracing::info!("SYNC {}: Document {} updated", self.collection, edit.id);
                Ok(edit)
            }
            Err(e) => {
                tracing::error!(
                    "SYNC {}: Error updating document {}: {}",
                    self.collection,
                    edit.id,
                    e
                );
                Err(TaskError::update(e))
            }
        }
    }

    pub async fn delete(&self, id: &str) -> TaskResult<String> {
        match self.store.delete(&self.collection, id).await {
            Ok(()) => {
                tracing::info!("SYNC {}: Document {} deleted", self.collection, id);
                Ok(id.to_string())
            }
            Err(e) => {
                tracing::error!(
                    "SYNC {}: Error deleting document {}: {}",
                    self.collection,
                    id,
                    e
                );
                Err(TaskError::delete(e))
            }
        }
    }

    /// Mark a task completed. A task missing remotely is reported as
    /// [`StoreError::NotFound`] and nothing is written.
    pub async fn complete(&self, id: &str) -> TaskResult<String> {
        let result = async {
            if self.store.get(&self.collection, id).await?.is_none() {
                return Err(StoreError::NotFound(id.to_string()));
            }
            self.store
                .patch(&self.collection, id, FieldPatch::status(TaskStatus::Completed))
                .await
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!("SYNC {}: Task {} completed", self.collection, id);
                Ok(id.to_string())
            }
            Err(StoreError::NotFound(_)) => {
                tracing::error!("SYNC {}: Document does not exist: {}", self.collection, id);
                Err(TaskError::complete(StoreError::NotFound(id.to_string())))
            }
            Err(e) => {
                tracing::error!(
                    "SYNC {}: Error completing task {}: {}",
                    self.collection,
                    id,
                    e
                );
                Err(TaskError::complete(e))
            }
        }
    }
}
