//! Trip persistence - organized submodules

mod core;
pub mod mappers;

pub use core::*;

pub use mappers::{map_summary_row, map_task_row, parse_trip_uuid};
