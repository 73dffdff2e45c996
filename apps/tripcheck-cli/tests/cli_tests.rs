//! Commands run end to end against temp files, a temp database and a local webhook

use axum::{routing::post, Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use serial_test::serial;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tripcheck_cli::{resolve_config, run, Cli, Commands};
use tripcheck_core::{ObservabilityConfig, ObservabilityManager, TripcheckConfig};

fn observability() -> Arc<ObservabilityManager> {
    Arc::new(ObservabilityManager::new(ObservabilityConfig::default()).unwrap())
}

async fn run_command(command: Commands, config: &TripcheckConfig) -> (bool, String) {
    let mut output = Vec::new();
    let passed = run(command, config, observability(), &mut output)
        .await
        .unwrap();
    (passed, String::from_utf8(output).unwrap())
}

fn write(dir: &TempDir, name: &str, document: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, document.to_string()).unwrap();
    path
}

fn school_run() -> Value {
    json!({
        "tripName": "School run",
        "tripDate": "2026-05-04",
        "coordinatorId": "coord-1",
        "duration": "1 day",
        "tasks": [
            { "name": "Counting kids", "description": "Headcount", "time": "07:30", "isDone": true },
            { "name": "Dropping kids", "description": "At the gate", "time": "10:00" }
        ]
    })
}

async fn spawn_webhook() -> String {
    let app = Router::new().route(
        "/hook",
        post(|Json(document): Json<Value>| async move {
            Json(json!({ "message": "Workflow was started", "echo": document }))
        })
        .get(|| async { Json(json!({ "status": "ready" })) }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}/hook")
}

#[tokio::test]
async fn templates_are_listed_and_printable() {
    let config = TripcheckConfig::default();

    let (passed, text) = run_command(Commands::Templates, &config).await;
    assert!(passed);
    assert!(text.contains("goa - Goa getaway"));

    let (_, text) = run_command(
        Commands::Template {
            id: "jaipur".to_string(),
        },
        &config,
    )
    .await;
    let document: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(document["tripName"], "Jaipur excursion");
    assert_eq!(document["groups"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_template_is_an_error() {
    let mut output = Vec::new();
    let error = run(
        Commands::Template {
            id: "atlantis".to_string(),
        },
        &TripcheckConfig::default(),
        observability(),
        &mut output,
    )
    .await
    .unwrap_err();
    assert!(error.to_string().contains("atlantis"));
}

#[tokio::test]
async fn validate_reports_issues_through_the_outcome() {
    let dir = TempDir::new().unwrap();
    let config = TripcheckConfig::default();

    let valid = write(&dir, "valid.json", &school_run());
    let (passed, text) = run_command(Commands::Validate { file: valid }, &config).await;
    assert!(passed);
    assert!(text.contains("ready to submit"));

    let mut broken = school_run();
    broken["tasks"][1]["time"] = json!("  ");
    let broken = write(&dir, "broken.json", &broken);
    let (passed, text) = run_command(Commands::Validate { file: broken }, &config).await;
    assert!(!passed);
    assert!(text.contains("Day 1, task 2: task time is required"));
}

#[tokio::test]
async fn show_prints_days() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "trip.json", &school_run());

    let (_, text) = run_command(Commands::Show { file }, &TripcheckConfig::default()).await;
    assert!(text.contains("1/2 tasks done"));
    assert!(text.contains("Day 1 - 2026-05-04 (Monday)"));
    assert!(text.contains("[x] 07:30 Counting kids - Headcount"));
}

#[tokio::test]
async fn import_list_and_get() {
    let dir = TempDir::new().unwrap();
    let mut config = TripcheckConfig::default();
    config.database.path = Some(dir.path().join("trips.db"));

    let file = write(&dir, "trip.json", &school_run());
    let (_, text) = run_command(Commands::Import { file }, &config).await;
    let id = text.trim().rsplit(' ').next().unwrap().to_string();

    let (_, text) = run_command(Commands::List, &config).await;
    assert!(text.contains("Found 1 trips"));
    assert!(text.contains(&id));
    assert!(text.contains("(1 days, 2 tasks)"));

    let (_, text) = run_command(Commands::Get { id }, &config).await;
    let stored: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(stored["TripCoordinatorId"], "coord-1");
    assert_eq!(stored["days"][0]["tasks"][0]["status"], "completed");
}

#[tokio::test]
async fn database_commands_need_a_path() {
    let mut output = Vec::new();
    let error = run(
        Commands::List,
        &TripcheckConfig::default(),
        observability(),
        &mut output,
    )
    .await
    .unwrap_err();
    let message = error.to_string();
    assert!(message.contains("Database path is not configured"));
}

#[tokio::test]
async fn submit_trip_and_task_to_webhook() {
    let dir = TempDir::new().unwrap();
    let mut config = TripcheckConfig::default();
    config.webhook.url = Some(spawn_webhook().await);

    let file = write(&dir, "trip.json", &school_run());
    let (passed, text) = run_command(Commands::SubmitTrip { file }, &config).await;
    assert!(passed);
    assert!(text.contains("Submitted trip \"School run\""));
    assert!(text.contains("Workflow was started"));

    let task = write(
        &dir,
        "task.json",
        &json!({ "id": "k1", "name": "Counting kids", "time": "07:30" }),
    );
    let (passed, text) = run_command(Commands::SubmitTask { file: task }, &config).await;
    assert!(passed);
    assert!(text.contains("Submitted task \"Counting kids\" (k1) at "));

    let (_, text) = run_command(Commands::Status, &config).await;
    assert!(text.contains("ready"));
}

#[tokio::test]
async fn unsubmittable_trip_never_reaches_the_webhook() {
    let dir = TempDir::new().unwrap();
    let config = TripcheckConfig::default();

    let mut trip = school_run();
    trip["tripName"] = json!("");
    let file = write(&dir, "trip.json", &trip);

    // No webhook is configured, so reaching it would be an error
    let (passed, text) = run_command(Commands::SubmitTrip { file }, &config).await;
    assert!(!passed);
    assert!(text.contains("trip name is required"));
}

#[tokio::test]
async fn failed_submission_names_the_task() {
    let dir = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let mut config = TripcheckConfig::default();
    config.webhook.url = Some(format!("http://{address}/hook"));
    config.webhook.timeout_secs = 2;

    let task = write(
        &dir,
        "task.json",
        &json!({ "id": "k1", "name": "Counting kids", "time": "07:30" }),
    );
    let mut output = Vec::new();
    let error = run(Commands::SubmitTask { file: task }, &config, observability(), &mut output)
        .await
        .unwrap_err();
    assert!(error.to_string().contains("Counting kids"));
}

#[test]
#[serial]
fn cli_flags_override_configuration() {
    let dir = TempDir::new().unwrap();
    let config_file = dir.path().join("tripcheck.yaml");
    std::fs::write(
        &config_file,
        "webhook:\n  url: http://file/hook\nserver:\n  port: 4000\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "tripcheck",
        "--config",
        config_file.to_str().unwrap(),
        "--webhook-url",
        "http://flag/hook",
        "--verbose",
        "list",
    ])
    .unwrap();
    let config = resolve_config(&cli).unwrap();

    assert_eq!(config.webhook.url.as_deref(), Some("http://flag/hook"));
    assert_eq!(config.server.port, 4000);
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn missing_config_file_is_an_error() {
    let cli = Cli::try_parse_from(["tripcheck", "--config", "/nonexistent/tripcheck.json", "list"])
        .unwrap();
    assert!(resolve_config(&cli).is_err());
}

#[test]
#[serial]
fn malformed_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config_file = dir.path().join("bad.yaml");
    std::fs::write(&config_file, "server:\n  port: [not a port\n").unwrap();

    let cli = Cli::try_parse_from([
        "tripcheck",
        "--config",
        config_file.to_str().unwrap(),
        "list",
    ])
    .unwrap();
    let error = resolve_config(&cli).unwrap_err();
    assert!(error.to_string().contains("bad.yaml"));
}

#[test]
#[serial]
fn invalid_webhook_flag_is_rejected() {
    let cli = Cli::try_parse_from(["tripcheck", "--webhook-url", "ftp://nope", "status"]).unwrap();
    assert!(resolve_config(&cli).is_err());
}
