//! Identifier generation for trips, groups and tasks
//!
//! Identifiers only have to be unique within one editing session.

use std::sync::atomic::{AtomicU64, Ordering};
use tripcheck_common::GENERATED_ID_LEN;
use uuid::Uuid;

/// Source of fresh entity identifiers
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random lowercase alphanumeric tokens taken from a v4 UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> String {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(GENERATED_ID_LEN);
        token
    }
}

/// Monotonic counter, `prefix-1`, `prefix-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("t")
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}
