//! Submission gate for trips and tasks
//!
//! A trip is submittable when its name and date are present, it has at least
//! one dated group, every group has at least one task, and every task has a
//! name and a time. "Present" means non-empty after trimming whitespace.

use crate::models::{Task, Trip};
use serde::Serialize;
use std::fmt;
use tripcheck_common::{day_label, is_blank};

/// Where a validation issue was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum IssueLocation {
    Trip,
    Group { index: usize },
    Task { group: usize, index: usize },
}

impl fmt::Display for IssueLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trip => write!(f, "trip"),
            Self::Group { index } => write!(f, "{}", day_label(*index)),
            Self::Task { group, index } => write!(f, "{}, task {}", day_label(*group), index + 1),
        }
    }
}

/// One failed submission rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub location: IssueLocation,
    pub field: &'static str,
    pub message: String,
}

impl ValidationIssue {
    fn new(location: IssueLocation, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            location,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Every rule the trip currently fails, in display order
#[must_use]
pub fn validation_issues(trip: &Trip) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if is_blank(&trip.name) {
        issues.push(ValidationIssue::new(IssueLocation::Trip, "tripName", "trip name is required"));
    }
    if is_blank(&trip.date) {
        issues.push(ValidationIssue::new(IssueLocation::Trip, "tripDate", "trip date is required"));
    }
    if trip.groups.is_empty() {
        issues.push(ValidationIssue::new(IssueLocation::Trip, "groups", "trip has no days"));
    }

    for (gi, group) in trip.groups.iter().enumerate() {
        let location = IssueLocation::Group { index: gi };
        if is_blank(&group.date) {
            issues.push(ValidationIssue::new(location, "date", "date is required"));
        }
        if group.tasks.is_empty() {
            issues.push(ValidationIssue::new(location, "tasks", "day has no tasks"));
        }
        for (ti, task) in group.tasks.iter().enumerate() {
            let location = IssueLocation::Task {
                group: gi,
                index: ti,
            };
            issues.extend(task_issues(task).map(|(field, message)| {
                ValidationIssue::new(location, field, message)
            }));
        }
    }

    issues
}

fn task_issues(task: &Task) -> impl Iterator<Item = (&'static str, &'static str)> {
    let name = is_blank(&task.name).then_some(("name", "task name is required"));
    let time = is_blank(&task.time).then_some(("time", "task time is required"));
    name.into_iter().chain(time)
}

/// Whether the trip may be handed to a persistence or notification collaborator
#[must_use]
pub fn is_submittable(trip: &Trip) -> bool {
    validation_issues(trip).is_empty()
}

/// Whether a single task carries its required fields
#[must_use]
pub fn is_task_submittable(task: &Task) -> bool {
    task_issues(task).next().is_none()
}

/// A trip that passed [`check`]
///
/// Whole-trip submission only accepts this type, so an unsubmittable trip
/// cannot reach the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTrip(Trip);

impl ValidatedTrip {
    #[must_use]
    pub fn trip(&self) -> &Trip {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Trip {
        self.0
    }
}

impl AsRef<Trip> for ValidatedTrip {
    fn as_ref(&self) -> &Trip {
        &self.0
    }
}

/// Validate a trip, keeping it on success and returning every issue on failure
///
/// # Errors
/// Returns the list of failing rules when the trip is not submittable
pub fn check(trip: Trip) -> std::result::Result<ValidatedTrip, Vec<ValidationIssue>> {
    let issues = validation_issues(&trip);
    if issues.is_empty() {
        Ok(ValidatedTrip(trip))
    } else {
        Err(issues)
    }
}
