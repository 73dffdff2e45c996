//! Row mapping utilities for converting database rows to stored trips

use crate::{
    database::TripSummary,
    error::{Result, TripError},
    storage::{StoredTask, TaskStatus},
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Parse a trip id column
///
/// # Errors
///
/// Returns an error if the column does not hold a UUID
pub fn parse_trip_uuid(uuid_str: &str) -> Result<Uuid> {
    Uuid::parse_str(uuid_str)
        .map_err(|e| TripError::database(format!("Invalid trip id {uuid_str}: {e}")))
}

/// Map a `trip_tasks` row to a stored task
///
/// # Errors
///
/// Returns an error if a column is missing or the status is unknown
pub fn map_task_row(row: &SqliteRow) -> Result<StoredTask> {
    let status: String = row
        .try_get("status")
        .map_err(|e| TripError::database(format!("Failed to read task status: {e}")))?;

    Ok(StoredTask {
        name: row.get("name"),
        description: row.get("description"),
        time: row.get("time"),
        status: status.parse::<TaskStatus>()?,
        remarks: row.get("remarks"),
        submitted_at: row.get("submitted_at"),
    })
}

/// Map a summary row (trip columns plus `day_count`/`task_count`)
///
/// # Errors
///
/// Returns an error if a column is missing or the id is not a UUID
pub fn map_summary_row(row: &SqliteRow) -> Result<TripSummary> {
    let id: String = row.get("id");
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| TripError::database(format!("Failed to read created_at: {e}")))?;
    let day_count: i64 = row.get("day_count");
    let task_count: i64 = row.get("task_count");

    Ok(TripSummary {
        id: parse_trip_uuid(&id)?,
        trip_name: row.get("trip_name"),
        coordinator_id: row.get("coordinator_id"),
        duration: row.get("duration"),
        day_count: day_count.try_into().unwrap_or(0),
        task_count: task_count.try_into().unwrap_or(0),
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trip_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_trip_uuid(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_trip_uuid("not-a-uuid"), Err(TripError::Database(_))));
    }
}
