//! Boundary decoding of trip and task documents
//!
//! Request bodies are decoded into loose payload structs first and then
//! turned into well-typed [`Trip`]/[`Task`] values. Structural invariants
//! (at least one group, at least one task per group, unique ids) are enforced
//! here; submittability is not, see [`crate::validator`].
//!
//! Two trip shapes are accepted:
//! - grouped: `{ tripName, tripDate, tripDiscussion, groups: [{ groupId, date, tasks }] }`
//! - flat: `{ tripName, tripDate, tasks: [...] }`, which becomes one group dated `tripDate`

use crate::error::{Result, TripError};
use crate::ids::IdSource;
use crate::models::{DateGroup, Task, Trip};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TripPayload {
    #[serde(default)]
    trip_name: Option<String>,
    #[serde(default)]
    trip_date: Option<String>,
    #[serde(default)]
    trip_discussion: Option<String>,
    #[serde(default)]
    coordinator_id: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    groups: Option<Vec<GroupPayload>>,
    #[serde(default)]
    tasks: Option<Vec<TaskPayload>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupPayload {
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    tasks: Vec<TaskPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskPayload {
    #[serde(default, alias = "TripId")]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default, alias = "completed")]
    is_done: Option<bool>,
    #[serde(default, alias = "userRemark")]
    remarks: Option<String>,
    #[serde(default)]
    evidence: Option<String>,
    #[serde(default)]
    submitted_at: Option<String>,
}

/// Blank optional strings normalise to absent
fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

struct Decoder<'a> {
    ids: &'a dyn IdSource,
    seen: HashSet<String>,
}

impl<'a> Decoder<'a> {
    fn new(ids: &'a dyn IdSource) -> Self {
        Self {
            ids,
            seen: HashSet::new(),
        }
    }

    fn claim_id(&mut self, id: Option<String>) -> Result<String> {
        let id = match present(id) {
            Some(id) => id,
            None => self.ids.next_id(),
        };
        if !self.seen.insert(id.clone()) {
            return Err(TripError::decode(format!("duplicate id: {id}")));
        }
        Ok(id)
    }

    fn task(&mut self, payload: TaskPayload) -> Result<Task> {
        Ok(Task {
            id: self.claim_id(payload.id)?,
            name: payload.name.unwrap_or_default(),
            description: present(payload.description),
            time: payload.time.unwrap_or_default(),
            completed: payload.is_done.unwrap_or(false),
            remarks: payload.remarks.unwrap_or_default(),
            evidence: present(payload.evidence),
            submitted_at: present(payload.submitted_at),
        })
    }

    fn group(&mut self, position: usize, payload: GroupPayload) -> Result<DateGroup> {
        if payload.tasks.is_empty() {
            return Err(TripError::decode(format!("group {} has no tasks", position + 1)));
        }
        let id = self.claim_id(payload.group_id)?;
        let tasks = payload
            .tasks
            .into_iter()
            .map(|task| self.task(task).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        Ok(DateGroup {
            id,
            date: payload.date.unwrap_or_default(),
            tasks,
        })
    }

    fn trip(&mut self, payload: TripPayload) -> Result<Trip> {
        let date = payload.trip_date.unwrap_or_default();

        let groups = match (payload.groups, payload.tasks) {
            (Some(_), Some(_)) => {
                return Err(TripError::decode("trip carries both `groups` and `tasks`"))
            }
            (None, None) => {
                return Err(TripError::decode("trip carries neither `groups` nor `tasks`"))
            }
            (Some(groups), None) => {
                if groups.is_empty() {
                    return Err(TripError::decode("trip has no groups"));
                }
                groups
                    .into_iter()
                    .enumerate()
                    .map(|(position, group)| self.group(position, group).map(Arc::new))
                    .collect::<Result<Vec<_>>>()?
            }
            (None, Some(tasks)) => {
                debug!(tasks = tasks.len(), "decoding flat task list as one group");
                let flat = GroupPayload {
                    group_id: None,
                    date: Some(date.clone()),
                    tasks,
                };
                if flat.tasks.is_empty() {
                    return Err(TripError::decode("trip has no tasks"));
                }
                vec![Arc::new(self.group(0, flat)?)]
            }
        };

        Ok(Trip {
            name: payload.trip_name.unwrap_or_default(),
            date,
            discussion: present(payload.trip_discussion),
            coordinator_id: present(payload.coordinator_id),
            duration: present(payload.duration),
            groups,
        })
    }
}

/// Decode a trip document
///
/// # Errors
/// Returns `TripError::Decode` if the body is not a trip document or breaks a
/// structural invariant
pub fn decode_trip(body: &[u8], ids: &dyn IdSource) -> Result<Trip> {
    let payload: TripPayload = serde_json::from_slice(body)
        .map_err(|e| TripError::decode(format!("invalid trip document: {e}")))?;
    Decoder::new(ids).trip(payload)
}

/// Decode a single task document
///
/// # Errors
/// Returns `TripError::Decode` if the body is not a task document
pub fn decode_task(body: &[u8], ids: &dyn IdSource) -> Result<Task> {
    let payload: TaskPayload = serde_json::from_slice(body)
        .map_err(|e| TripError::decode(format!("invalid task document: {e}")))?;
    Decoder::new(ids).task(payload)
}

/// Encode a trip as its canonical JSON document
///
/// # Errors
/// Returns `TripError::Serialization` if encoding fails
pub fn encode_trip(trip: &Trip) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(trip)?)
}
