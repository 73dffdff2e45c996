//! Fixtures shared by unit tests, integration tests and benches

use crate::database::TripDatabase;
use crate::error::{Result, TransportError};
use crate::ids::SequentialIds;
use crate::models::Trip;
use crate::storage::{StoredDay, StoredTask, StoredTrip, TaskStatus};
use crate::submission::{Transport, TransportResponse};
use crate::templates::template;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use tempfile::TempDir;

/// The Goa sample trip with deterministic ids (`t-1`, `t-2`, ...)
///
/// Group ids are `t-1` and `t-4`; task ids are `t-2`, `t-3`, `t-5`, `t-6`.
#[must_use]
pub fn sample_trip() -> Trip {
    let ids = SequentialIds::default();
    template("goa").map_or_else(|| Trip::blank(&ids), |goa| goa.load(&ids))
}

/// A valid stored trip with two days
#[must_use]
pub fn sample_stored_trip() -> StoredTrip {
    let task = |name: &str, description: &str, time: &str| StoredTask {
        name: name.to_string(),
        description: description.to_string(),
        time: time.to_string(),
        status: TaskStatus::Pending,
        remarks: String::new(),
        submitted_at: String::new(),
    };

    StoredTrip {
        trip_name: "School run".to_string(),
        coordinator_id: "coord-1".to_string(),
        duration: "2 days".to_string(),
        days: vec![
            StoredDay {
                date: "2026-05-04".to_string(),
                tasks: vec![
                    task("Checking the bus", "Walkaround inspection", "07:00"),
                    task("Counting kids", "Headcount at pickup", "07:30"),
                ],
            },
            StoredDay {
                date: "2026-05-05".to_string(),
                tasks: vec![task("Dropping kids", "Drop at school gate", "10:00")],
            },
        ],
    }
}

/// Open a fresh trip database in a temporary directory
///
/// Keep the returned directory alive for as long as the database is used.
///
/// # Errors
/// Returns an error if the directory or the database cannot be created
pub async fn create_test_database_and_connect() -> Result<(TripDatabase, TempDir)> {
    let dir = TempDir::new()?;
    let db = TripDatabase::new(&dir.path().join("trips.db")).await?;
    Ok((db, dir))
}

/// In-memory transport that answers every request with one canned response
/// and records the posted documents
#[derive(Debug)]
pub struct MockTransport {
    response: std::result::Result<TransportResponse, TransportError>,
    posted: Mutex<Vec<Value>>,
    gets: Mutex<usize>,
}

impl MockTransport {
    #[must_use]
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            response: Ok(TransportResponse::new(status, body)),
            posted: Mutex::new(Vec::new()),
            gets: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn ok() -> Self {
        Self::responding(200, r#"{"message":"Workflow was started"}"#)
    }

    #[must_use]
    pub fn failing(error: TransportError) -> Self {
        Self {
            response: Err(error),
            posted: Mutex::new(Vec::new()),
            gets: Mutex::new(0),
        }
    }

    /// Documents posted so far
    #[must_use]
    pub fn posted(&self) -> Vec<Value> {
        self.posted
            .lock()
            .map(|posted| posted.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_count(&self) -> usize {
        self.gets.lock().map(|gets| *gets).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(
        &self,
        document: &Value,
    ) -> std::result::Result<TransportResponse, TransportError> {
        if let Ok(mut posted) = self.posted.lock() {
            posted.push(document.clone());
        }
        self.response.clone()
    }

    async fn get(&self) -> std::result::Result<TransportResponse, TransportError> {
        if let Ok(mut gets) = self.gets.lock() {
            *gets += 1;
        }
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::is_submittable;

    #[test]
    fn test_sample_trip_ids() {
        let trip = sample_trip();
        assert_eq!(trip.groups[0].id, "t-1");
        assert_eq!(trip.groups[0].tasks[0].id, "t-2");
        assert_eq!(trip.groups[1].id, "t-4");
        assert_eq!(trip.groups[1].tasks[1].id, "t-6");
        assert!(is_submittable(&trip));
    }

    #[test]
    fn test_sample_stored_trip_is_valid() {
        assert!(sample_stored_trip().validate().is_ok());
    }

    #[tokio::test]
    async fn test_create_test_database() {
        let (db, _dir) = create_test_database_and_connect().await.unwrap();
        assert!(db.is_connected().await);
    }
}
