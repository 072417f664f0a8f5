#![forbid(unsafe_code)]

// HTTP front end for the avgcalc window; the window itself lives in avgcalc-core.
pub mod errors;
pub mod numbers_api;
pub mod server;
pub mod upstream;

pub use errors::{DaemonError, FetchError};
pub use numbers_api::create_numbers_router;
pub use upstream::{HttpNumberSource, NumberSource};
