use crate::errors::StoreError;
use crate::models::{Task, TaskDraft, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point in time as the remote document store represents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    #[serde(default)]
    pub nanos: u32,
}

impl Timestamp {
    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }

    pub fn to_datetime(&self) -> Result<DateTime<Utc>, StoreError> {
        DateTime::from_timestamp(self.seconds, self.nanos).ok_or_else(|| {
            StoreError::Decode(format!(
                "timestamp out of range: {}s {}ns",
                self.seconds, self.nanos
            ))
        })
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(&dt)
    }
}

fn default_status() -> String {
    TaskStatus::Pending.as_str().to_string()
}

/// Fields of a task document in the `Tasks` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
    #[serde(default = "default_status")]
    pub status: String,
}

impl Default for TaskDocument {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date: None,
            status: default_status(),
        }
    }
}

impl TaskDocument {
    /// Document written by a create: the draft's fields with status forced to pending.
    pub fn from_draft(draft: &TaskDraft) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.clone(),
            date: draft.date.as_ref().map(Timestamp::from_datetime),
            status: default_status(),
        }
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_wire(&self.status)
    }

    /// Decode into a task. Like an unknown status, an unrepresentable date
    /// is logged and dropped so one malformed document cannot fail a listing.
    pub fn into_task(self, id: impl Into<String>) -> Task {
        let id = id.into();
        let date = self.date.and_then(|ts| match ts.to_datetime() {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!("Document {}: {}, treating as no due date", id, e);
                None
            }
        });
        let status = self.status();
        Task {
            id,
            title: self.title,
            description: self.description,
            date,
            status,
        }
    }
}

/// A document as enumerated or read from the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub fields: TaskDocument,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, fields: TaskDocument) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn into_task(self) -> Task {
        self.fields.into_task(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_timestamp_conversion_is_lossless() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let ts = Timestamp::from_datetime(&dt);
        assert_eq!(ts.nanos, 123_456_789);
        assert_eq!(ts.to_datetime().unwrap(), dt);
    }

    #[test]
    fn test_out_of_range_timestamp_is_decode_error() {
        let ts = Timestamp {
            seconds: i64::MAX,
            nanos: 0,
        };
        assert!(matches!(ts.to_datetime(), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_draft_document_is_pending() {
        let due = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let draft = TaskDraft::new("Grade essays", "Batch 3").with_date(due);
        let doc = TaskDocument::from_draft(&draft);

        assert_eq!(doc.status, "pending");
        assert_eq!(doc.date, Some(Timestamp::from_datetime(&due)));

        let task = doc.into_task("abc");
        assert_eq!(task, Task::from_draft("abc", &draft));
    }

    #[test]
    fn test_sparse_document_decodes_with_defaults() {
        let doc: TaskDocument = serde_json::from_value(json!({"title": "Only a title"})).unwrap();
        let task = doc.into_task("x");

        assert_eq!(task.title, "Only a title");
        assert_eq!(task.description, "");
        assert_eq!(task.date, None);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_absent_date_is_not_serialized() {
        let doc = TaskDocument {
            title: "t".to_string(),
            ..TaskDocument::default()
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("date").is_none());
        assert_eq!(value["status"], "pending");
    }

    #[test]
    fn test_out_of_range_date_decodes_as_absent() {
        let doc = TaskDocument {
            title: "Broken date".to_string(),
            date: Some(Timestamp {
                seconds: i64::MAX,
                nanos: 0,
            }),
            status: "completed".to_string(),
            ..TaskDocument::default()
        };

        let task = doc.into_task("bad");

        assert_eq!(task.id, "bad");
        assert_eq!(task.title, "Broken date");
        assert_eq!(task.date, None);
        assert_eq!(task.status, TaskStatus::Completed);
    }
}
