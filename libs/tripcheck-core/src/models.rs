//! Data models for trips, day groups and checklist tasks
//!
//! Nested containers hold `Arc`s so that an edit can produce a new [`Trip`]
//! snapshot that shares every untouched group and task with the previous one.
//! Serialization uses the canonical JSON field names (`tripName`, `groupId`,
//! `isDone`, ...). Decoding goes through [`crate::wire`], never through these
//! types directly.

use crate::ids::IdSource;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier, unique within the editing session
    pub id: String,
    /// Task name, required for submission
    pub name: String,
    /// Optional longer description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scheduled time, `HH:MM`, required for submission
    pub time: String,
    /// Completion flag
    #[serde(rename = "isDone")]
    pub completed: bool,
    /// Free-text remarks from field staff
    pub remarks: String,
    /// Filename of attached evidence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    /// Local time of the first acknowledged submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}

impl Task {
    /// A blank, not-done task with the given scheduled time
    #[must_use]
    pub fn blank(id: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: None,
            time: time.into(),
            completed: false,
            remarks: String::new(),
            evidence: None,
            submitted_at: None,
        }
    }

    /// A named task scheduled at `time`
    #[must_use]
    pub fn named(id: impl Into<String>, name: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::blank(id, time)
        }
    }

    /// Reference used when reporting on this task
    #[must_use]
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::Task {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// Whether the task was acknowledged by the webhook at least once
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

/// A calendar date within a trip and its ordered tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateGroup {
    #[serde(rename = "groupId")]
    pub id: String,
    pub date: String,
    pub tasks: Vec<Arc<Task>>,
}

impl DateGroup {
    /// A group holding a single task
    #[must_use]
    pub fn new(id: impl Into<String>, date: impl Into<String>, first_task: Task) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            tasks: vec![Arc::new(first_task)],
        }
    }

    #[must_use]
    pub fn task_index(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == task_id)
    }
}

/// Top-level planned itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trip {
    #[serde(rename = "tripName")]
    pub name: String,
    #[serde(rename = "tripDate")]
    pub date: String,
    #[serde(rename = "tripDiscussion", skip_serializing_if = "Option::is_none")]
    pub discussion: Option<String>,
    #[serde(rename = "coordinatorId", skip_serializing_if = "Option::is_none")]
    pub coordinator_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub groups: Vec<Arc<DateGroup>>,
}

impl Trip {
    /// The trip a fresh form starts from: one undated group with one blank task
    #[must_use]
    pub fn blank(ids: &dyn IdSource) -> Self {
        let task = Task::blank(ids.next_id(), "");
        Self {
            name: String::new(),
            date: String::new(),
            discussion: None,
            coordinator_id: None,
            duration: None,
            groups: vec![Arc::new(DateGroup::new(ids.next_id(), "", task))],
        }
    }

    #[must_use]
    pub fn group_index(&self, group_id: &str) -> Option<usize> {
        self.groups.iter().position(|group| group.id == group_id)
    }

    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<&DateGroup> {
        self.groups
            .iter()
            .find(|group| group.id == group_id)
            .map(AsRef::as_ref)
    }

    /// Locate a task as `(group index, task index)`
    #[must_use]
    pub fn locate_task(&self, task_id: &str) -> Option<(usize, usize)> {
        self.groups
            .iter()
            .enumerate()
            .find_map(|(gi, group)| group.task_index(task_id).map(|ti| (gi, ti)))
    }

    #[must_use]
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.locate_task(task_id)
            .map(|(gi, ti)| self.groups[gi].tasks[ti].as_ref())
    }

    /// All tasks in display order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.groups
            .iter()
            .flat_map(|group| group.tasks.iter().map(AsRef::as_ref))
    }

    #[must_use]
    pub fn task_count(&self) -> usize {
        self.groups.iter().map(|group| group.tasks.len()).sum()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks().filter(|task| task.completed).count()
    }

    #[must_use]
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::Trip {
            name: self.name.clone(),
        }
    }
}

/// Identifies the entity a submission or report is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityRef {
    Trip { name: String },
    Task { id: String, name: String },
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trip { name } if name.trim().is_empty() => write!(f, "untitled trip"),
            Self::Trip { name } => write!(f, "trip \"{name}\""),
            Self::Task { id, name } if name.trim().is_empty() => {
                write!(f, "untitled task ({id})")
            }
            Self::Task { id, name } => write!(f, "task \"{name}\" ({id})"),
        }
    }
}
