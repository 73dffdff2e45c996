//! Ingestion server: trip creation, inspection reports and health

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, instrument, warn};
use tripcheck_core::{
    decode_trip, to_stored, FormData, FormValue, InspectionReport, ObservabilityManager, RandomIds,
    TripDatabase, TripError, UploadedFile,
};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub observability: Arc<ObservabilityManager>,
    /// Trips are decoded but not stored when `None`
    pub database: Option<TripDatabase>,
}

/// Body of every `/api/*` answer that is not an inspection acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    /// Id of the stored trip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ApiResponse {
    fn ok(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            id: None,
        }
    }
}

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub database: String,
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn internal_error() -> ApiResult {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::failed("Internal Server Error")),
    )
}

#[instrument(skip(state, body), fields(bytes = body.len()))]
async fn new_trip(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let trip = match decode_trip(&body, &RandomIds) {
        Ok(trip) => trip,
        Err(e) => {
            warn!("Rejected trip document: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::failed(e.to_string())),
            );
        }
    };
    info!(
        trip_name = %trip.name,
        days = trip.groups.len(),
        tasks = trip.task_count(),
        "Received trip"
    );

    let Some(database) = &state.database else {
        return (
            StatusCode::OK,
            Json(ApiResponse::ok("Trip created successfully", None)),
        );
    };

    match database.save_trip(&to_stored(&trip)).await {
        Ok(uuid) => (
            StatusCode::OK,
            Json(ApiResponse::ok("Trip created successfully", Some(uuid.to_string()))),
        ),
        Err(TripError::Validation { message }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::failed(message)),
        ),
        Err(e) => {
            error!("Failed to store trip: {}", e);
            internal_error()
        }
    }
}

/// Collect every multipart part; files keep only their metadata
async fn read_form(mut multipart: Multipart) -> Result<FormData, String> {
    let mut form = FormData::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(|e| e.to_string())?;
            form.insert(
                name,
                FormValue::File(UploadedFile {
                    file_name,
                    content_type,
                    size: data.len(),
                }),
            );
        } else {
            let text = field.text().await.map_err(|e| e.to_string())?;
            form.insert_text(name, text);
        }
    }
    Ok(form)
}

#[instrument(skip_all)]
async fn bus_backend(
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<serde_json::Value>) {
    let form = match multipart {
        Ok(multipart) => read_form(multipart).await,
        Err(rejection) => Err(rejection.body_text()),
    };
    let form = match form {
        Ok(form) => form,
        Err(message) => {
            warn!("Unreadable inspection form: {}", message);
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "success": false, "message": message })),
            );
        }
    };

    let report = InspectionReport::from_form(&form);
    info!(
        driver = report.driver_name.as_deref().unwrap_or(""),
        bus = report.bus_number.as_deref().unwrap_or(""),
        seats = report.total_seats(),
        approved_seats = report.approved_seats(),
        driver_photo = report.driver_photo.is_some(),
        bus_front_photo = report.bus_front_photo.is_some(),
        "Received inspection report"
    );

    match serde_json::to_value(report.acknowledgement()) {
        Ok(ack) => (StatusCode::CREATED, Json(ack)),
        Err(e) => {
            error!("Failed to encode inspection acknowledgement: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "success": false, "message": "Internal Server Error" })),
            )
        }
    }
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let connected = match &state.database {
        Some(database) => Some(database.is_connected().await),
        None => None,
    };
    let health = state.observability.health_status(connected);
    debug!("Health check: {}", health.status);

    let code = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let database = health
        .checks
        .get("database")
        .map(|check| check.status.clone())
        .unwrap_or_default();

    (
        code,
        Json(HealthResponse {
            status: health.status,
            version: health.version,
            uptime_secs: health.uptime_secs,
            database,
        }),
    )
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/new_trip", post(new_trip))
        .route("/api/bus-backend", post(bus_backend))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Ingestion server
pub struct TripServer {
    host: String,
    port: u16,
    state: AppState,
}

impl TripServer {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, state: AppState) -> Self {
        Self {
            host: host.into(),
            port,
            state,
        }
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Bind and serve until the process stops
    ///
    /// # Errors
    /// Returns an error if the server fails to bind or serve
    #[instrument(skip(self), fields(address = %self.address()))]
    pub async fn start(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.address()).await?;
        info!("Tripcheck server listening on {}", listener.local_addr()?);
        axum::serve(listener, router(self.state)).await
    }
}
