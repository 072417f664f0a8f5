//! Core of the avgcalc service: a bounded window of unique numbers and the
//! average computed over it.
//!
//! Nothing here performs I/O except [`config`], which loads the service
//! configuration at startup.

pub mod average;
pub mod config;
pub mod error;
pub mod types;
pub mod window;

pub use average::{average, format_average, round_for_display};
pub use config::AppConfig;
pub use error::Error;
pub use error::Result;
pub use types::{Number, NumberKind, UnknownKind};
pub use window::{Window, WindowStore, WindowUpdate};
