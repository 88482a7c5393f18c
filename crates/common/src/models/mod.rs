pub mod candle;
pub mod market;
pub mod signal;
pub mod user;

pub use candle::Candle;
pub use market::MarketSnapshot;
pub use signal::{SignalType, TokenSignal, TradingPoints};
pub use user::UserState;
