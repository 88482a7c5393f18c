pub mod services;
pub mod signals;
pub mod universe;

pub use services::signal_service::{SignalError, SignalService, derive_signal};
pub use signals::{ConfidenceBand, confidence_score, price_change_30m, trading_points};
