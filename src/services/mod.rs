pub mod chart_service;
pub mod deviation_service;
pub mod normalizer;
pub mod prediction_service;
pub mod preference_service;
pub mod render_service;
pub mod trade_service;
pub mod watch_service;
