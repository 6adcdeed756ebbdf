//! Readers for command-management products: backstop command loads,
//! maneuver summaries, and the SI alignment table of a characteristics file.

pub mod alignment;
pub mod backstop;
pub mod config;
pub mod error;
pub mod io;
pub mod maneuver;
pub mod params;
pub mod time;
pub mod value;

pub use alignment::{read_alignment_table, AlignmentTable, Detector};
pub use backstop::{read_backstop, CommandRecord};
pub use config::ParseConfig;
pub use error::{ParseCmError, Result};
pub use maneuver::{read_maneuvers, AttitudeRecord, ManeuverRecord};
pub use time::{ChandraTime, TimeConverter};
pub use value::Value;
