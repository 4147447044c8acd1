pub mod config;
pub mod error;
pub mod reservation;
pub mod tiers;

pub use config::AppConfig;
pub use error::{PassportError, PassportResult};
