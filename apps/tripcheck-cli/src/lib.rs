//! Tripcheck CLI library
//!
//! Command definitions, the output printers and the ingestion server.

pub mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tripcheck_common::{day_label, parse_date, truncate_string};
use tripcheck_core::{
    check, database::parse_trip_uuid, decode_task, decode_trip, encode_trip, is_task_submittable,
    template, to_stored, validation_issues, ConfigLoader, HttpTransport, IdSource,
    ObservabilityManager, RandomIds, Result, StoredTrip, SubmissionDispatcher, Task, Trip,
    TripDatabase, TripError, TripSummary, TripcheckConfig, ValidationIssue, TEMPLATES,
};

use crate::server::{AppState, TripServer};

#[derive(Parser, Debug)]
#[command(name = "tripcheck")]
#[command(about = "Bus-trip checklists: validate, submit and collect trips")]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite trip store
    #[arg(long, short, global = true)]
    pub database: Option<PathBuf>,

    /// Webhook that receives submissions
    #[arg(long, global = true)]
    pub webhook_url: Option<String>,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List built-in trip templates
    Templates,
    /// Print a template trip as JSON
    Template {
        /// Template id
        id: String,
    },
    /// Check a trip document against the submission rules
    Validate {
        /// Trip document
        file: PathBuf,
    },
    /// Print a trip day by day
    Show {
        /// Trip document
        file: PathBuf,
    },
    /// Submit a whole trip to the webhook
    SubmitTrip {
        /// Trip document
        file: PathBuf,
    },
    /// Submit a single task to the webhook
    SubmitTask {
        /// Task document
        file: PathBuf,
    },
    /// Fetch the webhook status
    Status,
    /// Store a trip document in the database
    Import {
        /// Trip document
        file: PathBuf,
    },
    /// List stored trips
    List,
    /// Print a stored trip
    Get {
        /// Trip UUID
        id: String,
    },
    /// Start the ingestion server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,
    },
}

/// Resolve configuration: defaults, files, environment, then CLI flags
///
/// # Errors
/// Returns an error if an explicit config file is missing or malformed, or
/// the final configuration is invalid
pub fn resolve_config(cli: &Cli) -> Result<TripcheckConfig> {
    let mut loader = ConfigLoader::new().with_validation(false);
    if let Some(path) = &cli.config {
        loader = loader.require_config_path(path);
    }

    let mut config = loader.load()?;
    if let Some(path) = &cli.database {
        config.database.path = Some(path.clone());
    }
    if let Some(url) = &cli.webhook_url {
        config.webhook.url = Some(url.clone());
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate()?;
    Ok(config)
}

/// Read and decode a trip document
///
/// # Errors
/// Returns an error if the file cannot be read or is not a trip document
pub fn read_trip(path: &Path, ids: &dyn IdSource) -> Result<Trip> {
    let body = std::fs::read(path)?;
    decode_trip(&body, ids)
}

/// Read and decode a task document
///
/// # Errors
/// Returns an error if the file cannot be read or is not a task document
pub fn read_task(path: &Path, ids: &dyn IdSource) -> Result<Task> {
    let body = std::fs::read(path)?;
    decode_task(&body, ids)
}

/// Open the configured trip store
///
/// # Errors
/// Returns an error if no database path is configured or it cannot be opened
pub async fn open_database(config: &TripcheckConfig) -> Result<TripDatabase> {
    let path = config.database.path.as_deref().ok_or_else(|| {
        TripError::configuration(
            "Database path is not configured (set TRIPCHECK_DATABASE_PATH or --database)",
        )
    })?;
    TripDatabase::new(path).await
}

/// Build a dispatcher for the configured webhook
///
/// # Errors
/// Returns an error if no webhook URL is configured
pub fn webhook_dispatcher(config: &TripcheckConfig) -> Result<SubmissionDispatcher<HttpTransport>> {
    let url = config.require_webhook_url()?;
    let transport = HttpTransport::new(url, config.webhook.timeout())?;
    Ok(SubmissionDispatcher::new(transport))
}

/// Print the built-in templates
///
/// # Errors
/// Returns an error if writing fails
pub fn print_templates<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "Found {} templates:", TEMPLATES.len())?;
    for entry in TEMPLATES {
        writeln!(
            writer,
            "  • {} - {} ({}, {} days)",
            entry.id,
            entry.name,
            entry.date,
            entry.day_count()
        )?;
    }
    Ok(())
}

/// Print a trip grouped by day
///
/// # Errors
/// Returns an error if writing fails
pub fn print_trip<W: Write>(trip: &Trip, writer: &mut W) -> Result<()> {
    let name = if trip.name.trim().is_empty() {
        "(untitled trip)"
    } else {
        trip.name.as_str()
    };
    writeln!(writer, "{name} ({})", trip.date)?;
    if let Some(discussion) = &trip.discussion {
        writeln!(writer, "  {discussion}")?;
    }
    writeln!(
        writer,
        "  {}/{} tasks done",
        trip.completed_count(),
        trip.task_count()
    )?;

    for (index, group) in trip.groups.iter().enumerate() {
        writeln!(writer)?;
        match parse_date(&group.date) {
            Ok(date) => writeln!(
                writer,
                "{} - {} ({})",
                day_label(index),
                group.date,
                date.format("%A")
            )?,
            Err(_) => writeln!(writer, "{} - {}", day_label(index), group.date)?,
        }
        for task in &group.tasks {
            let mark = if task.completed { "x" } else { " " };
            write!(writer, "  [{mark}] {} {}", task.time, task.name)?;
            if let Some(description) = &task.description {
                write!(writer, " - {description}")?;
            }
            writeln!(writer)?;
            if !task.remarks.is_empty() {
                writeln!(writer, "      Remarks: {}", task.remarks)?;
            }
            if let Some(at) = &task.submitted_at {
                writeln!(writer, "      Submitted at: {at}")?;
            }
        }
    }
    Ok(())
}

/// Print validation issues, or a ready message when there are none
///
/// # Errors
/// Returns an error if writing fails
pub fn print_issues<W: Write>(issues: &[ValidationIssue], writer: &mut W) -> Result<()> {
    if issues.is_empty() {
        writeln!(writer, "✅ Trip is ready to submit")?;
        return Ok(());
    }

    writeln!(writer, "Found {} issues:", issues.len())?;
    for issue in issues {
        writeln!(writer, "  • {issue}")?;
    }
    Ok(())
}

/// Print stored trip summaries
///
/// # Errors
/// Returns an error if writing fails
pub fn print_summaries<W: Write>(summaries: &[TripSummary], writer: &mut W) -> Result<()> {
    if summaries.is_empty() {
        writeln!(writer, "No trips found")?;
        return Ok(());
    }

    writeln!(writer, "Found {} trips:", summaries.len())?;
    for summary in summaries {
        writeln!(
            writer,
            "  • {} {}",
            summary.id,
            truncate_string(&summary.trip_name, 40)
        )?;
        writeln!(
            writer,
            "    Coordinator: {}, {} ({} days, {} tasks)",
            summary.coordinator_id, summary.duration, summary.day_count, summary.task_count
        )?;
        writeln!(
            writer,
            "    Created: {}",
            summary.created_at.format("%Y-%m-%d %H:%M")
        )?;
    }
    Ok(())
}

/// Print a stored trip as JSON
///
/// # Errors
/// Returns an error if encoding or writing fails
pub fn print_stored_trip<W: Write>(stored: &StoredTrip, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, stored)?;
    writeln!(writer)?;
    Ok(())
}

/// Run one command, writing its output to `writer`
///
/// Returns `false` when the command ran but its input did not pass
/// validation.
///
/// # Errors
/// Returns an error if the command fails
pub async fn run<W: Write>(
    command: Commands,
    config: &TripcheckConfig,
    observability: Arc<ObservabilityManager>,
    writer: &mut W,
) -> anyhow::Result<bool> {
    let ids = RandomIds;
    debug!(?command, "Running command");

    match command {
        Commands::Templates => print_templates(writer)?,
        Commands::Template { id } => {
            let entry = template(&id).with_context(|| format!("Unknown template: {id}"))?;
            writer.write_all(&encode_trip(&entry.load(&ids))?)?;
            writeln!(writer)?;
        }
        Commands::Validate { file } => {
            let trip = read_trip(&file, &ids)
                .with_context(|| format!("Failed to read trip from {}", file.display()))?;
            let issues = validation_issues(&trip);
            print_issues(&issues, writer)?;
            return Ok(issues.is_empty());
        }
        Commands::Show { file } => {
            let trip = read_trip(&file, &ids)
                .with_context(|| format!("Failed to read trip from {}", file.display()))?;
            print_trip(&trip, writer)?;
        }
        Commands::SubmitTrip { file } => {
            let trip = read_trip(&file, &ids)
                .with_context(|| format!("Failed to read trip from {}", file.display()))?;
            let validated = match check(trip) {
                Ok(validated) => validated,
                Err(issues) => {
                    print_issues(&issues, writer)?;
                    return Ok(false);
                }
            };
            let ack = webhook_dispatcher(config)?.submit_trip(&validated).await?;
            writeln!(writer, "✅ Submitted {}", ack.entity)?;
            if !ack.body.is_null() {
                writeln!(writer, "{}", serde_json::to_string_pretty(&ack.body)?)?;
            }
        }
        Commands::SubmitTask { file } => {
            let task = read_task(&file, &ids)
                .with_context(|| format!("Failed to read task from {}", file.display()))?;
            if !is_task_submittable(&task) {
                writeln!(writer, "Task {} needs a name and a time", task.entity_ref())?;
                return Ok(false);
            }
            let stamped = webhook_dispatcher(config)?.submit_task(&task).await?;
            writeln!(
                writer,
                "✅ Submitted {} at {}",
                stamped.entity_ref(),
                stamped.submitted_at.as_deref().unwrap_or_default()
            )?;
        }
        Commands::Status => {
            let status = webhook_dispatcher(config)?
                .fetch_status()
                .await
                .context("Failed to fetch webhook status")?;
            writeln!(writer, "{}", serde_json::to_string_pretty(&status)?)?;
        }
        Commands::Import { file } => {
            let trip = read_trip(&file, &ids)
                .with_context(|| format!("Failed to read trip from {}", file.display()))?;
            let db = open_database(config).await?;
            let uuid = db.save_trip(&to_stored(&trip)).await?;
            info!(%uuid, "Imported trip");
            writeln!(writer, "✅ Stored trip {uuid}")?;
        }
        Commands::List => {
            let db = open_database(config).await?;
            print_summaries(&db.list_trips().await?, writer)?;
        }
        Commands::Get { id } => {
            let uuid = parse_trip_uuid(&id)?;
            let db = open_database(config).await?;
            print_stored_trip(&db.require_trip(&uuid).await?, writer)?;
        }
        Commands::Serve { host, port } => {
            let database = match &config.database.path {
                Some(_) => Some(open_database(config).await?),
                None => None,
            };
            let state = AppState {
                observability,
                database,
            };
            let server = TripServer::new(
                host.unwrap_or_else(|| config.server.host.clone()),
                port.unwrap_or(config.server.port),
                state,
            );
            writeln!(
                writer,
                "🚀 Starting tripcheck server on {}",
                server.address()
            )?;
            writer.flush()?;
            server.start().await?;
        }
    }

    Ok(true)
}
