pub mod client;
pub mod models;

pub use client::PredictionClient;
pub use models::{ApiError, RawPredictionResponse, RawPredictionRow, RawPriceRow, RawSummary};
