//! Tripcheck Common - Shared constants and helpers
//!
//! # Examples
//!
//! ```
//! use tripcheck_common::{day_label, is_blank, DEFAULT_TASK_TIME};
//!
//! assert_eq!(DEFAULT_TASK_TIME, "12:00");
//! assert!(is_blank("   "));
//! assert_eq!(day_label(0), "Day 1");
//! ```

pub mod constants;
pub mod utils;

pub use constants::*;
pub use utils::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_re_exported_items() {
        assert_eq!(DEFAULT_SERVER_PORT, 3000);
        assert_eq!(SEAT_PHOTO_PREFIX, "seatPhoto_");
        assert!(is_blank(""));
        assert_eq!(truncate_string("abcdef", 4), "a...");
    }
}
