//! Constants for tripcheck

/// Time given to tasks appended with "add task"
pub const DEFAULT_TASK_TIME: &str = "12:00";

/// Length of randomly generated entity identifiers
pub const GENERATED_ID_LEN: usize = 12;

/// Default port for the ingestion server
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default bind address for the ingestion server
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default timeout for webhook requests, in seconds
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;

/// Format of calendar dates carried by trips and day groups
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of the local `submittedAt` stamp (e.g. `02:30:15 pm`)
pub const SUBMITTED_AT_FORMAT: &str = "%I:%M:%S %P";

/// Prefix of indexed seat-photo fields in an inspection report
pub const SEAT_PHOTO_PREFIX: &str = "seatPhoto_";
