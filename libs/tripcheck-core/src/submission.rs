//! Submission of trips and tasks to the remote webhook
//!
//! The dispatcher serializes an entity to its canonical JSON document and
//! hands it to a [`Transport`]. Only a 2xx answer with an empty or JSON body
//! counts as acknowledged. Every other outcome is a [`SubmitError`] naming
//! the entity; nothing is stamped in that case, so the caller can submit the
//! same value again.

use crate::error::{Result, SubmitError, TransportError, TripError};
use crate::models::{EntityRef, Task};
use crate::validator::ValidatedTrip;
use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use tripcheck_common::format_submitted_at;

/// Raw answer of the remote collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Interpret the answer: 2xx with an empty or JSON body
    ///
    /// # Errors
    /// `Status` for non-2xx answers, `MalformedBody` for unparseable bodies
    pub fn into_json(self) -> std::result::Result<Value, TransportError> {
        if !self.is_success() {
            return Err(TransportError::Status { code: self.status });
        }
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|e| TransportError::MalformedBody(e.to_string()))
    }
}

/// The remote side of a submission
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON document
    async fn post_json(&self, document: &Value)
        -> std::result::Result<TransportResponse, TransportError>;

    /// GET the collaborator's status document
    async fn get(&self) -> std::result::Result<TransportResponse, TransportError>;
}

/// Webhook transport over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Build a transport for `url` with a per-request timeout
    ///
    /// # Errors
    /// Returns `TripError::Configuration` if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TripError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn read(
        response: reqwest::Response,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        document: &Value,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(document)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::read(response).await
    }

    async fn get(&self) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::read(response).await
    }
}

/// Source of the local `submittedAt` stamp
pub trait Clock: Send + Sync {
    fn stamp(&self) -> String;
}

/// Wall clock in the local timezone, `hh:mm:ss am`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn stamp(&self) -> String {
        format_submitted_at(&Local::now())
    }
}

/// Clock that always returns the same stamp
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn stamp(&self) -> String {
        self.0.clone()
    }
}

/// Entity handed to [`SubmissionDispatcher::submit`]
#[derive(Debug, Clone, Copy)]
pub enum Submission<'a> {
    Task(&'a Task),
    Trip(&'a ValidatedTrip),
}

impl Submission<'_> {
    #[must_use]
    pub fn entity_ref(&self) -> EntityRef {
        match self {
            Self::Task(task) => task.entity_ref(),
            Self::Trip(trip) => trip.trip().entity_ref(),
        }
    }

    fn document(&self) -> std::result::Result<Value, TransportError> {
        match self {
            Self::Task(task) => serde_json::to_value(task),
            Self::Trip(trip) => serde_json::to_value(trip.trip()),
        }
        .map_err(|e| TransportError::Encode(e.to_string()))
    }
}

/// Acknowledged submission
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    pub entity: EntityRef,
    /// Response body, `Null` when the webhook answered with an empty body
    pub body: Value,
}

/// Posts trips and tasks to a transport and interprets the answers
#[derive(Debug, Clone)]
pub struct SubmissionDispatcher<T, C = LocalClock> {
    transport: T,
    clock: C,
}

impl<T: Transport> SubmissionDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self::with_clock(transport, LocalClock)
    }
}

impl<T: Transport, C: Clock> SubmissionDispatcher<T, C> {
    pub fn with_clock(transport: T, clock: C) -> Self {
        Self { transport, clock }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Serialize and post an entity
    ///
    /// # Errors
    /// Returns a `SubmitError` naming the entity on network failure, non-2xx
    /// status or malformed response body
    #[instrument(skip(self, submission), fields(entity = %submission.entity_ref()))]
    pub async fn submit(
        &self,
        submission: &Submission<'_>,
    ) -> std::result::Result<Ack, SubmitError> {
        let entity = submission.entity_ref();
        let outcome = async {
            let document = submission.document()?;
            self.transport.post_json(&document).await?.into_json()
        }
        .await;

        match outcome {
            Ok(body) => {
                info!("Submission acknowledged");
                Ok(Ack { entity, body })
            }
            Err(source) => {
                warn!("Submission failed: {}", source);
                Err(SubmitError::new(entity, source))
            }
        }
    }

    /// Submit a task and return it stamped with the local submission time
    ///
    /// The posted document already carries the stamp. On failure the caller
    /// keeps its unstamped task.
    ///
    /// # Errors
    /// Returns a `SubmitError` naming the task if the webhook does not acknowledge it
    pub async fn submit_task(&self, task: &Task) -> std::result::Result<Task, SubmitError> {
        let mut stamped = task.clone();
        stamped.submitted_at = Some(self.clock.stamp());
        self.submit(&Submission::Task(&stamped)).await?;
        debug!(task_id = %stamped.id, "Task stamped as submitted");
        Ok(stamped)
    }

    /// Submit a whole trip
    ///
    /// # Errors
    /// Returns a `SubmitError` naming the trip if the webhook does not acknowledge it
    pub async fn submit_trip(&self, trip: &ValidatedTrip) -> std::result::Result<Ack, SubmitError> {
        self.submit(&Submission::Trip(trip)).await
    }

    /// Fetch the webhook's status document
    ///
    /// # Errors
    /// Returns the transport failure if the webhook cannot be read
    #[instrument(skip(self))]
    pub async fn fetch_status(&self) -> std::result::Result<Value, TransportError> {
        self.transport.get().await?.into_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_interpretation() {
        assert_eq!(
            TransportResponse::new(200, r#"{"ok":true}"#)
                .into_json()
                .unwrap(),
            serde_json::json!({"ok": true})
        );
        assert_eq!(
            TransportResponse::new(204, "").into_json().unwrap(),
            Value::Null
        );
        assert_eq!(
            TransportResponse::new(200, " \n").into_json().unwrap(),
            Value::Null
        );
        assert_eq!(
            TransportResponse::new(500, "{}").into_json(),
            Err(TransportError::Status { code: 500 })
        );
        assert!(matches!(
            TransportResponse::new(200, "<html>").into_json(),
            Err(TransportError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock("09:15:00 am".to_string()).stamp(), "09:15:00 am");
    }

    #[test]
    fn test_local_clock_shape() {
        let stamp = LocalClock.stamp();
        assert_eq!(stamp.len(), 11);
        assert!(stamp.ends_with("am") || stamp.ends_with("pm"));
    }

    #[test]
    fn test_submission_entity_ref() {
        let task = Task::named("t1", "Counting kids", "07:30");
        assert_eq!(
            Submission::Task(&task).entity_ref(),
            EntityRef::Task {
                id: "t1".to_string(),
                name: "Counting kids".to_string()
            }
        );
    }
}
