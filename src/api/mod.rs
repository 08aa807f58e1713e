pub mod prediction;

pub use prediction::{ApiError, PredictionClient};
