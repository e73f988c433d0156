//! Domain types for Market Copilot

pub mod candle;
pub mod series;
pub mod signal;
pub mod timeframe;

pub use candle::Candle;
pub use series::{MultiTimeframeInput, SeriesError, TimeframeSeries};
pub use signal::{format_label, strength_for, Signal, SignalType, BASE_CONDITION_COUNT};
pub use timeframe::Timeframe;

/// Symbol type alias
pub type Symbol = String;
