pub mod dates;
pub mod fields;
pub mod normalizer;

pub use normalizer::{normalize, NormalizedReservations};
