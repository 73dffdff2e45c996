use crate::{
    database::mappers::{map_summary_row, map_task_row},
    error::{Result, TripError},
    storage::{StoredDay, StoredTrip, STORAGE_SCHEMA_VERSION},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    pool::PoolOptions,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
    Row, SqlitePool,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const SCHEMA: [&str; 5] = [
    r"
    CREATE TABLE IF NOT EXISTS trips (
        id TEXT PRIMARY KEY,
        trip_name TEXT NOT NULL,
        coordinator_id TEXT NOT NULL,
        duration TEXT NOT NULL,
        schema_version INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS trip_days (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        trip_id TEXT NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        date TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS trip_tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        day_id INTEGER NOT NULL REFERENCES trip_days(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        time TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        remarks TEXT NOT NULL DEFAULT '',
        submitted_at TEXT NOT NULL DEFAULT ''
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_trip_days_trip ON trip_days(trip_id, position)",
    "CREATE INDEX IF NOT EXISTS idx_trip_tasks_day ON trip_tasks(day_id, position)",
];

/// Database connection pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabasePoolConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Idle timeout for connections
    pub idle_timeout: Duration,
    /// Enable WAL mode for better concurrency
    pub enable_wal_mode: bool,
}

impl Default for DatabasePoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600), // 10 minutes
            enable_wal_mode: true,
        }
    }
}

/// One row of the trip listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSummary {
    pub id: Uuid,
    pub trip_name: String,
    pub coordinator_id: String,
    pub duration: String,
    pub day_count: u64,
    pub task_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Database statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub trip_count: u64,
    pub day_count: u64,
    pub task_count: u64,
    pub completed_task_count: u64,
}

impl DatabaseStats {
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.trip_count + self.day_count + self.task_count
    }
}

/// SQLx-backed trip store
///
/// An explicit handle: callers open it, pass it where it is needed and get a
/// typed error when the connection fails.
#[derive(Debug, Clone)]
pub struct TripDatabase {
    pool: SqlitePool,
    config: DatabasePoolConfig,
}

impl TripDatabase {
    /// Open (creating if missing) a database file and run the schema
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection or the schema setup fails
    #[instrument]
    pub async fn new(database_path: &Path) -> Result<Self> {
        let database_url = format!("sqlite://{}", database_path.display());
        Self::from_connection_string(&database_url).await
    }

    /// Open a database from a connection string with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection or the schema setup fails
    #[instrument]
    pub async fn from_connection_string(database_url: &str) -> Result<Self> {
        Self::from_connection_string_with_config(database_url, DatabasePoolConfig::default()).await
    }

    /// Open a database from a connection string with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection or the schema setup fails
    #[instrument]
    pub async fn from_connection_string_with_config(
        database_url: &str,
        config: DatabasePoolConfig,
    ) -> Result<Self> {
        info!("Connecting to SQLite database: {}", database_url);

        let journal_mode = if config.enable_wal_mode {
            SqliteJournalMode::Wal
        } else {
            SqliteJournalMode::Delete
        };
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| TripError::database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(journal_mode);

        let pool = PoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| TripError::database(format!("Failed to connect to database: {e}")))?;

        let database = Self { pool, config };
        database.migrate().await?;

        info!(
            "Database connection pool established with {} max connections",
            database.config.max_connections
        );
        Ok(database)
    }

    /// Create the trip tables if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| TripError::database(format!("Failed to create schema: {e}")))?;
        }
        debug!("Trip schema is up to date");
        Ok(())
    }

    /// Get the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the database is connected
    #[instrument(skip(self))]
    pub async fn is_connected(&self) -> bool {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => {
                debug!("Database connection is healthy");
                true
            }
            Err(e) => {
                error!("Database connection check failed: {}", e);
                false
            }
        }
    }

    /// Validate and store a trip, returning its new id
    ///
    /// The trip, its days and their tasks are written in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `TripError::Validation` if a required field is missing, or a
    /// database error if the insert fails
    #[instrument(skip(self, trip), fields(trip_name = %trip.trip_name))]
    pub async fn save_trip(&self, trip: &StoredTrip) -> Result<Uuid> {
        trip.validate()?;

        let uuid = Uuid::new_v4();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TripError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO trips (id, trip_name, coordinator_id, duration, schema_version, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(uuid.to_string())
        .bind(&trip.trip_name)
        .bind(&trip.coordinator_id)
        .bind(&trip.duration)
        .bind(i64::from(STORAGE_SCHEMA_VERSION))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| TripError::database(format!("Failed to create trip: {e}")))?;

        for (day_position, day) in trip.days.iter().enumerate() {
            let day_id = sqlx::query(
                "INSERT INTO trip_days (trip_id, position, date) VALUES (?, ?, ?)",
            )
            .bind(uuid.to_string())
            .bind(i64::try_from(day_position).unwrap_or(i64::MAX))
            .bind(&day.date)
            .execute(&mut *tx)
            .await
            .map_err(|e| TripError::database(format!("Failed to create trip day: {e}")))?
            .last_insert_rowid();

            for (task_position, task) in day.tasks.iter().enumerate() {
                sqlx::query(
                    r"
                    INSERT INTO trip_tasks (
                        day_id, position, name, description, time, status, remarks, submitted_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    ",
                )
                .bind(day_id)
                .bind(i64::try_from(task_position).unwrap_or(i64::MAX))
                .bind(&task.name)
                .bind(&task.description)
                .bind(&task.time)
                .bind(task.status.as_str())
                .bind(&task.remarks)
                .bind(&task.submitted_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| TripError::database(format!("Failed to create trip task: {e}")))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| TripError::database(format!("Failed to commit trip: {e}")))?;

        info!("Created trip with UUID: {}", uuid);
        Ok(uuid)
    }

    /// Load a stored trip with its days and tasks in order
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a row cannot be mapped
    #[instrument(skip(self))]
    pub async fn get_trip(&self, uuid: &Uuid) -> Result<Option<StoredTrip>> {
        let Some(row) = sqlx::query(
            "SELECT trip_name, coordinator_id, duration FROM trips WHERE id = ?",
        )
        .bind(uuid.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TripError::database(format!("Failed to fetch trip: {e}")))?
        else {
            return Ok(None);
        };

        let day_rows = sqlx::query(
            "SELECT id, date FROM trip_days WHERE trip_id = ? ORDER BY position",
        )
        .bind(uuid.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TripError::database(format!("Failed to fetch trip days: {e}")))?;

        let mut days = Vec::with_capacity(day_rows.len());
        for day_row in &day_rows {
            let day_id: i64 = day_row.get("id");
            let task_rows = sqlx::query(
                r"
                SELECT name, description, time, status, remarks, submitted_at
                FROM trip_tasks WHERE day_id = ? ORDER BY position
                ",
            )
            .bind(day_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TripError::database(format!("Failed to fetch trip tasks: {e}")))?;

            days.push(StoredDay {
                date: day_row.get("date"),
                tasks: task_rows
                    .iter()
                    .map(map_task_row)
                    .collect::<Result<Vec<_>>>()?,
            });
        }

        Ok(Some(StoredTrip {
            trip_name: row.get("trip_name"),
            coordinator_id: row.get("coordinator_id"),
            duration: row.get("duration"),
            days,
        }))
    }

    /// Load a stored trip, failing if it does not exist
    ///
    /// # Errors
    ///
    /// Returns `TripError::TripNotFound` if no trip has this id
    pub async fn require_trip(&self, uuid: &Uuid) -> Result<StoredTrip> {
        self.get_trip(uuid)
            .await?
            .ok_or_else(|| TripError::TripNotFound {
                id: uuid.to_string(),
            })
    }

    /// List stored trips, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    #[instrument(skip(self))]
    pub async fn list_trips(&self) -> Result<Vec<TripSummary>> {
        let rows = sqlx::query(
            r"
            SELECT t.id, t.trip_name, t.coordinator_id, t.duration, t.created_at,
                (SELECT COUNT(*) FROM trip_days d WHERE d.trip_id = t.id) AS day_count,
                (SELECT COUNT(*) FROM trip_tasks k
                    JOIN trip_days d ON k.day_id = d.id
                    WHERE d.trip_id = t.id) AS task_count
            FROM trips t
            ORDER BY t.created_at DESC, t.rowid DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TripError::database(format!("Failed to list trips: {e}")))?;

        let trips = rows
            .iter()
            .map(map_summary_row)
            .collect::<Result<Vec<_>>>()?;
        debug!("Listed {} trips", trips.len());
        Ok(trips)
    }

    /// Delete a trip with its days and tasks; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    #[instrument(skip(self))]
    pub async fn delete_trip(&self, uuid: &Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| TripError::database(format!("Failed to delete trip: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Get database statistics
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    #[instrument(skip(self))]
    pub async fn get_stats(&self) -> Result<DatabaseStats> {
        let trip_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TripError::database(format!("Failed to get trip count: {e}")))?;

        let day_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trip_days")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TripError::database(format!("Failed to get day count: {e}")))?;

        let task_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trip_tasks")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TripError::database(format!("Failed to get task count: {e}")))?;

        let completed_task_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM trip_tasks WHERE status = 'completed'")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    TripError::database(format!("Failed to get completed task count: {e}"))
                })?;

        Ok(DatabaseStats {
            trip_count: trip_count.try_into().unwrap_or(0),
            day_count: day_count.try_into().unwrap_or(0),
            task_count: task_count.try_into().unwrap_or(0),
            completed_task_count: completed_task_count.try_into().unwrap_or(0),
        })
    }
}
