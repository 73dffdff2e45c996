//! Persisted trip schema and its mapping to the editing model
//!
//! The persisted shape predates the editing model: days instead of groups, a
//! `pending|completed` status instead of a flag, and empty strings instead of
//! absent values. Ids and evidence are not persisted.

use crate::error::{Result, TripError};
use crate::ids::IdSource;
use crate::models::{DateGroup, Task, Trip};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tripcheck_common::is_blank;

/// Version of the persisted shape written by [`to_stored`]
pub const STORAGE_SCHEMA_VERSION: u32 = 1;

/// Persisted completion state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(TripError::database(format!("Unknown task status: {other}"))),
        }
    }
}

impl From<bool> for TaskStatus {
    fn from(completed: bool) -> Self {
        if completed {
            Self::Completed
        } else {
            Self::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    pub name: String,
    pub description: String,
    pub time: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub submitted_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDay {
    pub date: String,
    pub tasks: Vec<StoredTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTrip {
    #[serde(rename = "tripName")]
    pub trip_name: String,
    #[serde(rename = "TripCoordinatorId")]
    pub coordinator_id: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(default)]
    pub days: Vec<StoredDay>,
}

impl StoredTrip {
    /// Every required-field message, in document order
    #[must_use]
    pub fn validation_errors(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if is_blank(&self.trip_name) {
            errors.push("Name is required");
        }
        if is_blank(&self.coordinator_id) {
            errors.push("Who will be the coordinator");
        }
        if is_blank(&self.duration) {
            errors.push("Duration is mendatory");
        }
        for day in &self.days {
            if is_blank(&day.date) {
                errors.push("Date is required");
            }
            for task in &day.tasks {
                if is_blank(&task.name) {
                    errors.push("Name is required");
                }
                if is_blank(&task.description) {
                    errors.push("Description is required");
                }
                if is_blank(&task.time) {
                    errors.push("Time is required");
                }
            }
        }
        errors
    }

    /// Check the required fields of the persisted schema
    ///
    /// # Errors
    /// Returns `TripError::Validation` listing every missing field
    pub fn validate(&self) -> Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TripError::validation(errors.join(", ")))
        }
    }

    #[must_use]
    pub fn task_count(&self) -> usize {
        self.days.iter().map(|day| day.tasks.len()).sum()
    }
}

/// Map an editing-model trip to the persisted shape
#[must_use]
pub fn to_stored(trip: &Trip) -> StoredTrip {
    StoredTrip {
        trip_name: trip.name.clone(),
        coordinator_id: trip.coordinator_id.clone().unwrap_or_default(),
        duration: trip.duration.clone().unwrap_or_default(),
        days: trip
            .groups
            .iter()
            .map(|group| StoredDay {
                date: group.date.clone(),
                tasks: group.tasks.iter().map(|task| stored_task(task)).collect(),
            })
            .collect(),
    }
}

fn stored_task(task: &Task) -> StoredTask {
    StoredTask {
        name: task.name.clone(),
        description: task.description.clone().unwrap_or_default(),
        time: task.time.clone(),
        status: task.completed.into(),
        remarks: task.remarks.clone(),
        submitted_at: task.submitted_at.clone().unwrap_or_default(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!is_blank(value)).then(|| value.to_string())
}

/// Map a persisted trip back to the editing model with fresh ids
///
/// Days without tasks get one blank task and a trip without days gets one
/// undated group, so the result always satisfies the structural invariants.
#[must_use]
pub fn from_stored(stored: &StoredTrip, ids: &dyn IdSource) -> Trip {
    let mut groups: Vec<Arc<DateGroup>> = stored
        .days
        .iter()
        .map(|day| {
            let group_id = ids.next_id();
            let mut tasks: Vec<Arc<Task>> = day
                .tasks
                .iter()
                .map(|task| {
                    Arc::new(Task {
                        id: ids.next_id(),
                        name: task.name.clone(),
                        description: non_empty(&task.description),
                        time: task.time.clone(),
                        completed: task.status == TaskStatus::Completed,
                        remarks: task.remarks.clone(),
                        evidence: None,
                        submitted_at: non_empty(&task.submitted_at),
                    })
                })
                .collect();
            if tasks.is_empty() {
                tasks.push(Arc::new(Task::blank(ids.next_id(), "")));
            }
            Arc::new(DateGroup {
                id: group_id,
                date: day.date.clone(),
                tasks,
            })
        })
        .collect();

    if groups.is_empty() {
        let task = Task::blank(ids.next_id(), "");
        groups.push(Arc::new(DateGroup::new(ids.next_id(), "", task)));
    }

    Trip {
        name: stored.trip_name.clone(),
        date: stored
            .days
            .first()
            .map(|day| day.date.clone())
            .unwrap_or_default(),
        discussion: None,
        coordinator_id: non_empty(&stored.coordinator_id),
        duration: non_empty(&stored.duration),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;

    fn school_run() -> StoredTrip {
        StoredTrip {
            trip_name: "School run".to_string(),
            coordinator_id: "coord-1".to_string(),
            duration: "1 day".to_string(),
            days: vec![StoredDay {
                date: "2026-05-04".to_string(),
                tasks: vec![
                    StoredTask {
                        name: "Counting kids".to_string(),
                        description: "Headcount at pickup".to_string(),
                        time: "07:30".to_string(),
                        status: TaskStatus::Completed,
                        remarks: "All present".to_string(),
                        submitted_at: "07:41:02 am".to_string(),
                    },
                    StoredTask {
                        name: "Dropping kids".to_string(),
                        description: "Drop at school gate".to_string(),
                        time: "10:00".to_string(),
                        status: TaskStatus::Pending,
                        remarks: String::new(),
                        submitted_at: String::new(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_stored_field_names() {
        let value = serde_json::to_value(school_run()).unwrap();
        assert_eq!(value["tripName"], "School run");
        assert_eq!(value["TripCoordinatorId"], "coord-1");
        assert_eq!(value["Duration"], "1 day");
        assert_eq!(value["days"][0]["tasks"][0]["status"], "completed");
        assert_eq!(value["days"][0]["tasks"][0]["submittedAt"], "07:41:02 am");
    }

    #[test]
    fn test_stored_task_defaults() {
        let task: StoredTask = serde_json::from_str(
            r#"{"name":"Checking the bus","description":"Walkaround","time":"08:15"}"#,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.remarks.is_empty());
        assert!(task.submitted_at.is_empty());
    }

    #[test]
    fn test_from_stored_uses_fresh_ids_and_first_day_date() {
        let trip = from_stored(&school_run(), &SequentialIds::default());

        assert_eq!(trip.date, "2026-05-04");
        assert_eq!(trip.groups[0].id, "t-1");
        assert_eq!(trip.groups[0].tasks[0].id, "t-2");
        assert!(trip.groups[0].tasks[0].completed);
        assert!(trip.groups[0].tasks[1].submitted_at.is_none());
        assert_eq!(trip.coordinator_id.as_deref(), Some("coord-1"));
    }

    #[test]
    fn test_to_stored_reverses_from_stored() {
        let stored = school_run();
        let trip = from_stored(&stored, &SequentialIds::default());
        assert_eq!(to_stored(&trip), stored);
    }

    #[test]
    fn test_to_stored_fills_absent_strings() {
        let ids = SequentialIds::default();
        let stored = to_stored(&Trip::blank(&ids));
        assert_eq!(stored.coordinator_id, "");
        assert_eq!(stored.days[0].tasks[0].description, "");
        assert_eq!(stored.days[0].tasks[0].status, TaskStatus::Pending);
    }

    #[test]
    fn test_from_stored_keeps_structural_invariants() {
        let mut stored = school_run();
        stored.days[0].tasks.clear();
        let trip = from_stored(&stored, &SequentialIds::default());
        assert_eq!(trip.groups[0].tasks.len(), 1);

        stored.days.clear();
        let trip = from_stored(&stored, &SequentialIds::default());
        assert_eq!(trip.groups.len(), 1);
        assert!(trip.date.is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(school_run().validate().is_ok());

        let mut stored = school_run();
        stored.duration = " ".to_string();
        stored.days[0].tasks[1].description.clear();
        assert_eq!(
            stored.validation_errors(),
            vec!["Duration is mendatory", "Description is required"]
        );
        let error = stored.validate().unwrap_err();
        assert!(matches!(error, TripError::Validation { .. }));
    }

    #[test]
    fn test_task_status_parsing() {
        assert_eq!(
            "pending".parse::<TaskStatus>().unwrap(),
            TaskStatus::Pending
        );
        assert_eq!(
            "completed".parse::<TaskStatus>().unwrap(),
            TaskStatus::Completed
        );
        assert!("done".parse::<TaskStatus>().is_err());
        assert_eq!(TaskStatus::from(true).to_string(), "completed");
    }
}
