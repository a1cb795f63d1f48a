use strum::Display;
use thiserror::Error;

/// Failure reported by a remote task store call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document {0} was written but could not be read back")]
    ReadBackMissing(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode document: {0}")]
    Decode(String),

    #[error("Rejected by remote store: {0}")]
    Rejected(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// The synchronisation operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
    Complete,
}

/// A rejected synchronisation operation, tagged with the operation that failed.
///
/// `TaskError` tagged `Fetch` is a fetch error, tagged `Create` a create error,
/// and so on; the wrapped [`StoreError`] says why the remote call rejected.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{operation} failed: {kind}")]
pub struct TaskError {
    pub operation: Operation,
    #[source]
    pub kind: StoreError,
}

impl TaskError {
    pub fn new(operation: Operation, kind: StoreError) -> Self {
        Self { operation, kind }
    }

    pub fn fetch(kind: StoreError) -> Self {
        Self::new(Operation::Fetch, kind)
    }

    pub fn create(kind: StoreError) -> Self {
        Self::new(Operation::Create, kind)
    }

    pub fn update(kind: StoreError) -> Self {
        Self::new(Operation::Update, kind)
    }

    pub fn delete(kind: StoreError) -> Self {
        Self::new(Operation::Delete, kind)
    }

    pub fn complete(kind: StoreError) -> Self {
        Self::new(Operation::Complete, kind)
    }

    pub fn is(&self, operation: Operation) -> bool {
        self.operation == operation
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StoreError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_display_names_operation() {
        let err = TaskError::complete(StoreError::NotFound("abc".to_string()));
        assert_eq!(err.to_string(), "complete failed: Document not found: abc");
        assert!(err.is(Operation::Complete));
        assert!(!err.is(Operation::Delete));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_serde_error_becomes_decode() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: StoreError = parse_err.into();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
