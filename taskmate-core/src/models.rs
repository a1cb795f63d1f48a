use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status of a task as stored remotely.
///
/// `Overdue` keeps its capitalised wire spelling. This client never writes it;
/// see [`crate::TaskStatus::derive`] for how it is computed for display.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pending")]
    #[strum(serialize = "pending")]
    Pending,
    #[serde(rename = "completed")]
    #[strum(serialize = "completed")]
    Completed,
    #[serde(rename = "Overdue")]
    #[strum(serialize = "Overdue")]
    Overdue,
}

impl TaskStatus {
    /// Decode a wire status. Unknown values fall back to `Pending` so a single
    /// malformed document cannot fail a whole listing.
    pub fn from_wire(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown task status {:?}, treating as pending", value);
            TaskStatus::Pending
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "Overdue",
        }
    }

    /// Status shown to the user: a pending task whose due date has passed is overdue.
    pub fn derive(self, date: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match (self, date) {
            (TaskStatus::Pending, Some(due)) if *due < now => TaskStatus::Overdue,
            (status, _) => status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Build the task a successful create produces: the draft plus the id the
    /// remote store assigned, always pending.
    pub fn from_draft(id: impl Into<String>, draft: &TaskDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            date: draft.date,
            status: TaskStatus::Pending,
        }
    }

    /// The editable fields of this task.
    pub fn to_edit(&self) -> TaskEdit {
        TaskEdit {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
        }
    }

    /// Overwrite title, description and date. `id` and `status` are untouched.
    pub fn apply_edit(&mut self, edit: &TaskEdit) {
        self.title = edit.title.clone();
        self.description = edit.description.clone();
        self.date = edit.date;
    }

    pub fn display_status(&self, now: DateTime<Utc>) -> TaskStatus {
        self.status.derive(self.date.as_ref(), now)
    }
}

/// Input to task creation. Status is not part of a draft: new tasks are pending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Full replacement of a task's editable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEdit {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Lifecycle of the task list retrieval.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_status_wire_names() {
        assert_eq!(TaskStatus::Pending.to_string(), "pending");
        assert_eq!(TaskStatus::Completed.to_string(), "completed");
        assert_eq!(TaskStatus::Overdue.to_string(), "Overdue");

        assert_eq!(
            serde_json::to_string(&TaskStatus::Overdue).unwrap(),
            "\"Overdue\""
        );
        assert_eq!(TaskStatus::from_wire("completed"), TaskStatus::Completed);
        assert_eq!(TaskStatus::from_wire("overdue"), TaskStatus::Overdue);
        assert_eq!(TaskStatus::from_wire("archived"), TaskStatus::Pending);
    }

    #[test]
    fn test_derived_overdue_only_for_pending_past_due() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let yesterday = now - Duration::days(1);
        let tomorrow = now + Duration::days(1);

        assert_eq!(
            TaskStatus::Pending.derive(Some(&yesterday), now),
            TaskStatus::Overdue
        );
        assert_eq!(
            TaskStatus::Pending.derive(Some(&tomorrow), now),
            TaskStatus::Pending
        );
        assert_eq!(TaskStatus::Pending.derive(None, now), TaskStatus::Pending);
        assert_eq!(
            TaskStatus::Completed.derive(Some(&yesterday), now),
            TaskStatus::Completed
        );
    }

    #[test]
    fn test_apply_edit_keeps_id_and_status() {
        let mut task = Task {
            id: "t1".to_string(),
            title: "Old".to_string(),
            description: "Old description".to_string(),
            date: None,
            status: TaskStatus::Completed,
        };
        let due = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let edit = TaskEdit {
            id: "t1".to_string(),
            title: "New".to_string(),
            description: "New description".to_string(),
            date: Some(due),
        };

        task.apply_edit(&edit);

        assert_eq!(task.id, "t1");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.title, "New");
        assert_eq!(task.date, Some(due));
        assert_eq!(task.to_edit(), edit);
    }

    #[test]
    fn test_fetch_status_names() {
        assert_eq!(FetchStatus::default(), FetchStatus::Idle);
        assert_eq!(FetchStatus::Succeeded.to_string(), "succeeded");
        assert_eq!(
            serde_json::to_string(&FetchStatus::Loading).unwrap(),
            "\"loading\""
        );
    }
}
