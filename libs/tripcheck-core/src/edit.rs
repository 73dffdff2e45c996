//! Structural edits on trip snapshots
//!
//! Every operation takes the current snapshot by reference and returns the
//! next one. Only the path to the edited node is copied; every other group and
//! task is shared with the previous snapshot. Edits that would leave a trip
//! without groups or a group without tasks are no-ops, as are edits that
//! target an unknown id.

use crate::ids::IdSource;
use crate::models::{DateGroup, Task, Trip};
use std::sync::Arc;
use tracing::debug;
use tripcheck_common::DEFAULT_TASK_TIME;

/// A single task field and its new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskField {
    Name(String),
    Description(Option<String>),
    Time(String),
    Completed(bool),
    Remarks(String),
    Evidence(Option<String>),
    SubmittedAt(Option<String>),
}

impl TaskField {
    fn apply(self, task: &mut Task) {
        match self {
            Self::Name(name) => task.name = name,
            Self::Description(description) => task.description = description,
            Self::Time(time) => task.time = time,
            Self::Completed(completed) => task.completed = completed,
            Self::Remarks(remarks) => task.remarks = remarks,
            Self::Evidence(evidence) => task.evidence = evidence,
            Self::SubmittedAt(at) => task.submitted_at = at,
        }
    }
}

/// A single trip-level field and its new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripField {
    Name(String),
    Date(String),
    Discussion(Option<String>),
    CoordinatorId(Option<String>),
    Duration(Option<String>),
}

/// Append a blank task to a group
#[must_use]
pub fn add_task(trip: &Trip, group_id: &str, ids: &dyn IdSource) -> Trip {
    let Some(gi) = trip.group_index(group_id) else {
        debug!(group_id, "add_task: unknown group");
        return trip.clone();
    };

    let mut next = trip.clone();
    let group = Arc::make_mut(&mut next.groups[gi]);
    group
        .tasks
        .push(Arc::new(Task::blank(ids.next_id(), DEFAULT_TASK_TIME)));
    next
}

/// Remove a task unless it is the last one of its group
#[must_use]
pub fn remove_task(trip: &Trip, group_id: &str, task_id: &str) -> Trip {
    let Some(gi) = trip.group_index(group_id) else {
        debug!(group_id, "remove_task: unknown group");
        return trip.clone();
    };
    let Some(ti) = trip.groups[gi].task_index(task_id) else {
        debug!(group_id, task_id, "remove_task: unknown task");
        return trip.clone();
    };
    if trip.groups[gi].tasks.len() <= 1 {
        debug!(group_id, task_id, "remove_task: last task kept");
        return trip.clone();
    }

    let mut next = trip.clone();
    Arc::make_mut(&mut next.groups[gi]).tasks.remove(ti);
    next
}

/// Replace one field of one task
#[must_use]
pub fn update_task_field(trip: &Trip, task_id: &str, field: TaskField) -> Trip {
    let Some((gi, ti)) = trip.locate_task(task_id) else {
        debug!(task_id, "update_task_field: unknown task");
        return trip.clone();
    };

    let mut next = trip.clone();
    let group = Arc::make_mut(&mut next.groups[gi]);
    field.apply(Arc::make_mut(&mut group.tasks[ti]));
    next
}

/// Stamp a task with the local time of an acknowledged submission
#[must_use]
pub fn mark_submitted(trip: &Trip, task_id: &str, submitted_at: impl Into<String>) -> Trip {
    update_task_field(
        trip,
        task_id,
        TaskField::SubmittedAt(Some(submitted_at.into())),
    )
}

/// Append an undated group holding one blank task
#[must_use]
pub fn add_group(trip: &Trip, ids: &dyn IdSource) -> Trip {
    let task = Task::blank(ids.next_id(), DEFAULT_TASK_TIME);
    let group = DateGroup::new(ids.next_id(), "", task);

    let mut next = trip.clone();
    next.groups.push(Arc::new(group));
    next
}

/// Remove a group unless it is the last one of the trip
#[must_use]
pub fn remove_group(trip: &Trip, group_id: &str) -> Trip {
    let Some(gi) = trip.group_index(group_id) else {
        debug!(group_id, "remove_group: unknown group");
        return trip.clone();
    };
    if trip.groups.len() <= 1 {
        debug!(group_id, "remove_group: keeping the last group of the trip");
        return trip.clone();
    }

    let mut next = trip.clone();
    next.groups.remove(gi);
    next
}

/// Set the calendar date of a group
#[must_use]
pub fn update_group_date(trip: &Trip, group_id: &str, date: impl Into<String>) -> Trip {
    let Some(gi) = trip.group_index(group_id) else {
        debug!(group_id, "update_group_date: unknown group");
        return trip.clone();
    };

    let mut next = trip.clone();
    Arc::make_mut(&mut next.groups[gi]).date = date.into();
    next
}

/// Replace one trip-level field; groups are shared untouched
#[must_use]
pub fn update_trip_field(trip: &Trip, field: TripField) -> Trip {
    let mut next = trip.clone();
    match field {
        TripField::Name(name) => next.name = name,
        TripField::Date(date) => next.date = date,
        TripField::Discussion(discussion) => next.discussion = discussion,
        TripField::CoordinatorId(coordinator_id) => next.coordinator_id = coordinator_id,
        TripField::Duration(duration) => next.duration = duration,
    }
    next
}
