//! # Wire Format Tests
//!
//! Decoding of documents as the remote store returns them.

use chrono::{TimeZone, Utc};
use serde_json::json;
use taskmate_core::{StoredDocument, TaskStatus};

/// Verifies that a listing payload decodes into tasks, keeping order and
/// converting native timestamps to UTC date-times.
#[test]
fn test_listing_payload_decodes_to_tasks() {
    let payload = json!([
        {
            "id": "a1",
            "fields": {
                "title": "Grade essays",
                "description": "Batch 3",
                "date": { "seconds": 1714521600, "nanos": 0 },
                "status": "pending"
            }
        },
        {
            "id": "b2",
            "fields": { "title": "Archive", "status": "Overdue" }
        }
    ]);

    let documents: Vec<StoredDocument> = serde_json::from_value(payload).unwrap();
    let tasks: Vec<_> = documents
        .into_iter()
        .map(StoredDocument::into_task)
        .collect();

    assert_eq!(tasks[0].id, "a1");
    assert_eq!(
        tasks[0].date,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(tasks[1].id, "b2");
    assert_eq!(tasks[1].date, None);
    assert_eq!(tasks[1].status, TaskStatus::Overdue);
}

/// Verifies that an unrepresentable date in one document does not prevent
/// decoding the rest of the listing.
#[test]
fn test_out_of_range_date_does_not_fail_listing() {
    let payload = json!([
        { "id": "bad", "fields": { "title": "x", "date": { "seconds": i64::MAX } } },
        { "id": "good", "fields": { "title": "y", "date": { "seconds": 0 } } }
    ]);

    let documents: Vec<StoredDocument> = serde_json::from_value(payload).unwrap();
    let tasks: Vec<_> = documents
        .into_iter()
        .map(StoredDocument::into_task)
        .collect();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].date, None);
    assert_eq!(tasks[0].title, "x");
    assert_eq!(tasks[1].date, Some(Utc.timestamp_opt(0, 0).unwrap()));
}
