//! In-process remote store.
//!
//! Behaves like the hosted document store (generated ids, id-ordered
//! enumeration, merge patches) and lets callers inject failures, latency and
//! read-after-write lag so every failure path of the sync layer can be driven.

use crate::remote::RemoteTaskStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use taskmate_core::{FieldPatch, StoreError, StoredDocument, TaskDocument};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Get,
    Add,
    Set,
    Patch,
    Delete,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    op: StoreOp,
    id: Option<String>,
    remaining: Option<usize>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, TaskDocument>>,
    failures: Vec<InjectedFailure>,
    calls: HashMap<StoreOp, usize>,
    // Fresh ids whose next N reads report "not found".
    read_lag: HashMap<String, usize>,
    read_lag_per_add: usize,
    latency: Option<Duration>,
}

impl Inner {
    fn record(&mut self, op: StoreOp, id: Option<&str>) -> Result<(), StoreError> {
        *self.calls.entry(op).or_insert(0) += 1;

        let position = self.failures.iter().position(|f| {
            f.op == op
                && match (&f.id, id) {
                    (None, _) => true,
                    (Some(wanted), Some(actual)) => wanted == actual,
                    (Some(_), None) => false,
                }
        });

        let Some(index) = position else {
            return Ok(());
        };

        let exhausted = match self.failures[index].remaining.as_mut() {
            Some(remaining) => {
                *remaining -= 1;
                *remaining == 0
            }
            None => false,
        };
        if exhausted {
            self.failures.remove(index);
        }

        let target = id.unwrap_or("*");
        tracing::debug!("MEMORY: injected {:?} failure for {}", op, target);
        Err(StoreError::Rejected(format!("{:?} rejected for {}", op, target)))
    }

    fn collection(&mut self, name: &str) -> &mut BTreeMap<String, TaskDocument> {
        self.collections.entry(name.to_string()).or_default()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document under a known id without counting it as a call.
    pub async fn insert(&self, collection: &str, id: &str, document: TaskDocument) {
        let mut inner = self.inner.lock().await;
        inner.collection(collection).insert(id.to_string(), document);
    }

    /// Read a document without going through failure injection or counters.
    pub async fn peek(&self, collection: &str, id: &str) -> Option<TaskDocument> {
        let inner = self.inner.lock().await;
        inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    pub async fn len(&self, collection: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.collections.get(collection).map_or(0, BTreeMap::len)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }

    /// Reject every `op` call (restricted to one document id when given).
    pub async fn fail_on(&self, op: StoreOp, id: Option<&str>) {
        self.inner.lock().await.failures.push(InjectedFailure {
            op,
            id: id.map(str::to_string),
            remaining: None,
        });
    }

    /// Reject only the next matching `op` call.
    pub async fn fail_once(&self, op: StoreOp, id: Option<&str>) {
        self.inner.lock().await.failures.push(InjectedFailure {
            op,
            id: id.map(str::to_string),
            remaining: Some(1),
        });
    }

    pub async fn clear_failures(&self) {
        self.inner.lock().await.failures.clear();
    }

    /// After each `add`, the new document is invisible to the next `reads` gets.
    pub async fn set_read_lag(&self, reads: usize) {
        self.inner.lock().await.read_lag_per_add = reads;
    }

    /// Delay every call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.inner.lock().await.latency = latency;
    }

    /// Number of calls made for `op`, including rejected ones.
    pub async fn calls(&self, op: StoreOp) -> usize {
        self.inner
            .lock()
            .await
            .calls
            .get(&op)
            .copied()
            .unwrap_or(0)
    }

    async fn delay(&self) {
        let latency = self.inner.lock().await.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RemoteTaskStore for MemoryStore {
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.delay().await;
        let mut inner = self.inner.lock().await;
        inner.record(StoreOp::List, None)?;

        Ok(inner
            .collection(collection)
            .iter()
            .map(|(id, fields)| StoredDocument::new(id.clone(), fields.clone()))
            .collect())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.delay().await;
        let mut inner = self.inner.lock().await;
        inner.record(StoreOp::Get, Some(id))?;

        if let Some(lag) = inner.read_lag.get(id).copied() {
            if lag <= 1 {
                inner.read_lag.remove(id);
            } else {
                inner.read_lag.insert(id.to_string(), lag - 1);
            }
            return Ok(None);
        }

        Ok(inner
            .collection(collection)
            .get(id)
            .map(|fields| StoredDocument::new(id, fields.clone())))
    }

    async fn add(&self, collection: &str, document: TaskDocument) -> Result<String, StoreError> {
        self.delay().await;
        let mut inner = self.inner.lock().await;
        inner.record(StoreOp::Add, None)?;

        let id = Uuid::new_v4().simple().to_string();
        inner.collection(collection).insert(id.clone(), document);
        if inner.read_lag_per_add > 0 {
            let lag = inner.read_lag_per_add;
            inner.read_lag.insert(id.clone(), lag);
        }

        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        document: TaskDocument,
    ) -> Result<(), StoreError> {
        self.delay().await;
        let mut inner = self.inner.lock().await;
        inner.record(StoreOp::Set, Some(id))?;

        inner.collection(collection).insert(id.to_string(), document);
        Ok(())
    }

    async fn patch(&self, collection: &str, id: &str, patch: FieldPatch) -> Result<(), StoreError> {
        self.delay().await;
        let mut inner = self.inner.lock().await;
        inner.record(StoreOp::Patch, Some(id))?;

        let docs = inner.collection(collection);
        let current = docs
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let merged = patch.apply_to(current)?;
        docs.insert(id.to_string(), merged);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.delay().await;
        let mut inner = self.inner.lock().await;
        inner.record(StoreOp::Delete, Some(id))?;

        inner.collection(collection).remove(id);
        Ok(())
    }
}
