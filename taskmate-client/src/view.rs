//! Read-side helpers for rendering the task list: filtering, sorting, derived
//! status and due-date formatting.

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use std::cmp::Ordering;
use taskmate_core::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Status,
    Title,
    Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    /// Case-insensitive substring match on the title.
    pub title_filter: Option<String>,
    /// Match on the displayed (derived) status.
    pub status: Option<TaskStatus>,
    pub sort: Option<(SortKey, SortOrder)>,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        self.title_filter = Some(needle.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn sorted_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort = Some((key, order));
        self
    }

    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        let title_ok = match &self.title_filter {
            Some(needle) => task
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        };
        let status_ok = match self.status {
            Some(status) => task.display_status(now) == status,
            None => true,
        };
        title_ok && status_ok
    }

    /// Tasks matching the filters, in the requested order. Sorting is stable.
    pub fn apply(&self, tasks: &[Task], now: DateTime<Utc>) -> Vec<Task> {
        let mut visible: Vec<Task> = tasks
            .iter()
            .filter(|task| self.matches(task, now))
            .cloned()
            .collect();

        if let Some((key, order)) = self.sort {
            visible.sort_by(|a, b| {
                let ordering = compare(a, b, key, now);
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        visible
    }
}

fn compare(a: &Task, b: &Task, key: SortKey, now: DateTime<Utc>) -> Ordering {
    match key {
        SortKey::Status => a
            .display_status(now)
            .as_str()
            .cmp(b.display_status(now).as_str()),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        // Undated tasks go last.
        SortKey::Date => match (&a.date, &b.date) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// `"May 1, 2024"`, or `"No due date"`.
pub fn format_due_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "No due date".to_string(),
    }
}

/// Quick due-date picks offered when creating or editing a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DueIn {
    Today,
    Tomorrow,
    #[value(name = "3days")]
    InThreeDays,
    #[value(name = "week")]
    InAWeek,
}

impl DueIn {
    pub fn days(&self) -> i64 {
        match self {
            DueIn::Today => 0,
            DueIn::Tomorrow => 1,
            DueIn::InThreeDays => 3,
            DueIn::InAWeek => 7,
        }
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(self.days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn task(id: &str, title: &str, days_from_now: Option<i64>, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            date: days_from_now.map(|d| now() + Duration::days(d)),
            status,
        }
    }

    fn fixture() -> Vec<Task> {
        vec![
            task("1", "Grade essays", Some(-2), TaskStatus::Pending),
            task("2", "Plan lessons", Some(3), TaskStatus::Pending),
            task("3", "grade quizzes", None, TaskStatus::Completed),
            task("4", "Call parents", Some(1), TaskStatus::Completed),
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_title_filter_is_case_insensitive() {
        let visible = TaskQuery::new().title_contains("GRADE").apply(&fixture(), now());
        assert_eq!(ids(&visible), vec!["1", "3"]);
    }

    #[test]
    fn test_status_filter_uses_derived_status() {
        let overdue = TaskQuery::new()
            .with_status(TaskStatus::Overdue)
            .apply(&fixture(), now());
        assert_eq!(ids(&overdue), vec!["1"]);

        let pending = TaskQuery::new()
            .with_status(TaskStatus::Pending)
            .apply(&fixture(), now());
        assert_eq!(ids(&pending), vec!["2"]);
    }

    #[test]
    fn test_date_sort_puts_undated_last() {
        let asc = TaskQuery::new()
            .sorted_by(SortKey::Date, SortOrder::Ascending)
            .apply(&fixture(), now());
        assert_eq!(ids(&asc), vec!["1", "4", "2", "3"]);

        let desc = TaskQuery::new()
            .sorted_by(SortKey::Date, SortOrder::Descending)
            .apply(&fixture(), now());
        assert_eq!(ids(&desc), vec!["3", "2", "4", "1"]);
    }

    #[test]
    fn test_status_sort_is_stable() {
        let sorted = TaskQuery::new()
            .sorted_by(SortKey::Status, SortOrder::Ascending)
            .apply(&fixture(), now());
        // "Overdue" < "completed" < "pending" by wire name.
        assert_eq!(ids(&sorted), vec!["1", "3", "4", "2"]);
    }

    #[test]
    fn test_format_due_date() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(format_due_date(Some(&date)), "May 1, 2024");
        assert_eq!(format_due_date(None), "No due date");
    }

    #[test]
    fn test_due_in_quick_picks() {
        assert_eq!(DueIn::Today.resolve(now()), now());
        assert_eq!(DueIn::InAWeek.resolve(now()), now() + Duration::days(7));
        assert_eq!(DueIn::from_str("3days", true).unwrap(), DueIn::InThreeDays);
    }
}
