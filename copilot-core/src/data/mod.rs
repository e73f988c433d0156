//! Candle supply: providers, rate limiting, CSV files, resampling

pub mod csv_io;
pub mod provider;
pub mod rate_limiter;
pub mod resample;
pub mod yahoo;

pub use csv_io::{read_candles, read_candles_csv, write_candles, write_candles_csv};
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use rate_limiter::{RateLimiter, RequestStats};
pub use resample::{bucket_start, resample};
pub use yahoo::YahooProvider;
