use crate::document::{TaskDocument, Timestamp};
use crate::errors::StoreError;
use crate::models::{TaskEdit, TaskStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Partial update of a task document.
///
/// Merge-patch semantics (RFC 7386): listed fields are replaced and a `null`
/// value removes the field. Fields not listed are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPatch(pub Map<String, Value>);

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite title, description and date. An absent date clears the stored one.
    pub fn edit(edit: &TaskEdit) -> Self {
        let date = match edit.date.as_ref().map(Timestamp::from_datetime) {
            Some(ts) => serde_json::json!({ "seconds": ts.seconds, "nanos": ts.nanos }),
            None => Value::Null,
        };

        Self::new()
            .set("title", Value::String(edit.title.clone()))
            .set("description", Value::String(edit.description.clone()))
            .set("date", date)
    }

    pub fn status(status: TaskStatus) -> Self {
        Self::new().set("status", Value::String(status.as_str().to_string()))
    }

    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.0.insert(field.to_string(), value);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply this patch to a document, returning the merged document.
    pub fn apply_to(&self, document: &TaskDocument) -> Result<TaskDocument, StoreError> {
        let mut value = serde_json::to_value(document)?;
        json_patch::merge(&mut value, &Value::Object(self.0.clone()));
        Ok(serde_json::from_value(value)?)
    }
}
