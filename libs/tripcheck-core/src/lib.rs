//! Tripcheck Core - trip checklists for bus trips
//!
//! A trip is a named itinerary of dated day groups, each holding ordered
//! checklist tasks. This crate provides the in-memory model and its
//! copy-on-write edits, the submission gate, boundary decoding, webhook
//! submission, the persisted schema with its SQLite store, and inspection
//! report parsing.
//!
//! # Features
//!
//! - **Snapshot edits**: every edit returns a new [`Trip`] sharing untouched
//!   groups and tasks with the previous one
//! - **Submission gate**: [`check`] turns a [`Trip`] into a [`ValidatedTrip`],
//!   the only form whole-trip submission accepts
//! - **Webhook submission**: async [`SubmissionDispatcher`] over a [`Transport`]
//! - **Persistence**: [`TripDatabase`] built on SQLx
//! - **Observability**: structured logging through `tracing`
//!
//! # Quick Start
//!
//! ```
//! use tripcheck_core::{add_task, check, template, RandomIds, TaskField, update_task_field};
//!
//! let ids = RandomIds;
//! let trip = template("goa").unwrap().load(&ids);
//! let group_id = trip.groups[0].id.clone();
//!
//! let trip = add_task(&trip, &group_id, &ids);
//! let new_task = trip.groups[0].tasks.last().unwrap().id.clone();
//! assert!(check(trip.clone()).is_err());
//!
//! let trip = update_task_field(&trip, &new_task, TaskField::Name("Headcount".into()));
//! assert!(check(trip).is_ok());
//! ```
//!
//! # Crate Features
//!
//! - `test-utils`: Enable test utilities (for testing only)

pub mod config;
pub mod config_loader;
pub mod database;
pub mod edit;
pub mod error;
pub mod ids;
pub mod inspection;
pub mod models;
pub mod observability;
pub mod storage;
pub mod submission;
pub mod templates;
pub mod validator;
pub mod wire;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{
    ConfigFile, DatabaseConfig, LoggingConfig, ServerConfig, TripcheckConfig, WebhookConfig,
};
pub use config_loader::ConfigLoader;
pub use database::{DatabasePoolConfig, DatabaseStats, TripDatabase, TripSummary};
pub use edit::{
    add_group, add_task, mark_submitted, remove_group, remove_task, update_group_date,
    update_task_field, update_trip_field, TaskField, TripField,
};
pub use error::{Result, SubmitError, TransportError, TripError};
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use inspection::{FormData, FormValue, InspectionAck, InspectionReport, UploadedFile};
pub use models::{DateGroup, EntityRef, Task, Trip};
pub use observability::{
    HealthStatus, ObservabilityConfig, ObservabilityError, ObservabilityManager,
};
pub use storage::{
    from_stored, to_stored, StoredDay, StoredTask, StoredTrip, TaskStatus, STORAGE_SCHEMA_VERSION,
};
pub use submission::{
    Ack, Clock, FixedClock, HttpTransport, LocalClock, Submission, SubmissionDispatcher, Transport,
    TransportResponse,
};
pub use templates::{template, TripTemplate, TEMPLATES};
pub use validator::{
    check, is_submittable, is_task_submittable, validation_issues, IssueLocation, ValidatedTrip,
    ValidationIssue,
};
pub use wire::{decode_task, decode_trip, encode_trip};

// Re-export commonly used types
pub use uuid::Uuid;
