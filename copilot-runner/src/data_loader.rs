//! Candle loading for the runner.
//!
//! Resolves the three timeframes for a symbol from one of:
//! 1. CSV files `<SYMBOL>_1m.csv`, `<SYMBOL>_5m.csv`, `<SYMBOL>_15m.csv` in a data directory
//!    (a missing 5m or 15m file is rebuilt from the 1m file)
//! 2. A live provider (Yahoo chart API), optionally saved back to CSV
//! 3. A deterministic synthetic random walk, only when the caller asks for it
//!
//! Synthetic data is a developer-only mode. Frames built from it are tagged so
//! reports can say so.

use chrono::{Datelike, Duration, FixedOffset, TimeZone, Weekday};
use copilot_core::data::{
    read_candles_csv, resample, write_candles_csv, DataError, DataProvider, DataSource,
};
use copilot_core::domain::{Candle, Timeframe};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One-minute candles in a regular session (09:30 to 16:00).
pub const SESSION_MINUTES: usize = 390;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no candle file for '{symbol}' at {path} (use --synthetic for synthetic data)")]
    MissingFile { symbol: String, path: PathBuf },

    #[error("no {timeframe} candles for '{symbol}'")]
    Empty { symbol: String, timeframe: Timeframe },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Raw candles for the three timeframes of one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleFrames {
    pub symbol: String,
    pub source: DataSource,
    pub m1: Vec<Candle>,
    pub m5: Vec<Candle>,
    pub m15: Vec<Candle>,
}

impl CandleFrames {
    pub fn get(&self, timeframe: Timeframe) -> &[Candle] {
        match timeframe {
            Timeframe::M1 => &self.m1,
            Timeframe::M5 => &self.m5,
            Timeframe::M15 => &self.m15,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }

    /// BLAKE3 fingerprint over the symbol and its 5m candles.
    pub fn dataset_hash(&self) -> String {
        compute_dataset_hash(&self.symbol, &self.m5)
    }
}

/// `<dir>/<SYMBOL>_<tf>.csv`.
pub fn frame_path(dir: &Path, symbol: &str, timeframe: Timeframe) -> PathBuf {
    dir.join(format!("{}_{}.csv", symbol.to_uppercase(), timeframe))
}

/// Load all three timeframes from CSV files in `dir`.
pub fn load_frames(dir: &Path, symbol: &str) -> Result<CandleFrames, LoadError> {
    let m1_path = frame_path(dir, symbol, Timeframe::M1);
    if !m1_path.exists() {
        return Err(LoadError::MissingFile {
            symbol: symbol.to_string(),
            path: m1_path,
        });
    }
    let m1 = read_candles_csv(&m1_path)?;
    if m1.is_empty() {
        return Err(LoadError::Empty {
            symbol: symbol.to_string(),
            timeframe: Timeframe::M1,
        });
    }

    let coarser = |timeframe: Timeframe| -> Result<Vec<Candle>, LoadError> {
        let path = frame_path(dir, symbol, timeframe);
        if path.exists() {
            Ok(read_candles_csv(&path)?)
        } else {
            tracing::debug!(%symbol, %timeframe, "no file, resampling from 1m");
            Ok(resample(&m1, timeframe))
        }
    };
    let m5 = coarser(Timeframe::M5)?;
    let m15 = coarser(Timeframe::M15)?;

    tracing::info!(
        %symbol,
        m1 = m1.len(),
        m5 = m5.len(),
        m15 = m15.len(),
        "loaded candles from CSV"
    );
    Ok(CandleFrames {
        symbol: symbol.to_string(),
        source: DataSource::CsvImport,
        m1,
        m5,
        m15,
    })
}

/// Fetch all three timeframes from a provider.
pub fn fetch_frames(
    provider: &dyn DataProvider,
    symbol: &str,
    range: &str,
) -> Result<CandleFrames, LoadError> {
    let mut fetched = Vec::with_capacity(Timeframe::ALL.len());
    for timeframe in Timeframe::ALL {
        let result = provider.fetch(symbol, timeframe, range)?;
        if result.candles.is_empty() {
            return Err(LoadError::Empty {
                symbol: symbol.to_string(),
                timeframe,
            });
        }
        tracing::info!(
            %symbol,
            %timeframe,
            candles = result.candles.len(),
            provider = provider.name(),
            "fetched candles"
        );
        fetched.push(result.candles);
    }

    let m15 = fetched.pop().unwrap_or_default();
    let m5 = fetched.pop().unwrap_or_default();
    let m1 = fetched.pop().unwrap_or_default();
    Ok(CandleFrames {
        symbol: symbol.to_string(),
        source: DataSource::YahooFinance,
        m1,
        m5,
        m15,
    })
}

/// Write all three timeframes to `<dir>/<SYMBOL>_<tf>.csv`.
pub fn save_frames(dir: &Path, frames: &CandleFrames) -> Result<Vec<PathBuf>, LoadError> {
    let mut written = Vec::with_capacity(Timeframe::ALL.len());
    for timeframe in Timeframe::ALL {
        let path = frame_path(dir, &frames.symbol, timeframe);
        write_candles_csv(&path, frames.get(timeframe))?;
        written.push(path);
    }
    Ok(written)
}

/// Deterministic synthetic frames: `sessions` weekdays of 1m candles from
/// 2024-06-03, resampled to 5m and 15m.
pub fn synthetic_frames(symbol: &str, sessions: usize) -> CandleFrames {
    tracing::warn!(%symbol, sessions, "generating synthetic data; results are tagged as synthetic");
    let m1 = generate_synthetic_minutes(symbol, sessions);
    let m5 = resample(&m1, Timeframe::M5);
    let m15 = resample(&m1, Timeframe::M15);
    CandleFrames {
        symbol: symbol.to_string(),
        source: DataSource::Synthetic,
        m1,
        m5,
        m15,
    }
}

/// Deterministic BLAKE3 hash over a candle series.
pub fn compute_dataset_hash(symbol: &str, candles: &[Candle]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    for candle in candles {
        hasher.update(candle.timestamp.to_rfc3339().as_bytes());
        hasher.update(&candle.open.to_le_bytes());
        hasher.update(&candle.high.to_le_bytes());
        hasher.update(&candle.low.to_le_bytes());
        hasher.update(&candle.close.to_le_bytes());
        hasher.update(&candle.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Random walk around 500 with a small intraday drift, seeded from the symbol.
fn generate_synthetic_minutes(symbol: &str, sessions: usize) -> Vec<Candle> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let Some(et) = FixedOffset::west_opt(4 * 3600) else {
        return Vec::new();
    };
    let Some(mut day) = et.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).single() else {
        return Vec::new();
    };

    let mut candles = Vec::with_capacity(sessions * SESSION_MINUTES);
    let mut price = 500.0_f64;
    let mut emitted = 0;

    while emitted < sessions {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day += Duration::days(1);
            continue;
        }

        // Each session drifts one way; minutes are noise around it.
        let drift: f64 = rng.gen_range(-0.0002..0.0002);
        for minute in 0..SESSION_MINUTES {
            let ret: f64 = drift + rng.gen_range(-0.0008..0.0008);
            let open = price;
            let close = (price * (1.0 + ret)).max(1.0);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.0004));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.0004));
            // U-shaped volume: heavier at the open and close
            let edge = (minute.min(SESSION_MINUTES - 1 - minute) as f64 / 60.0).min(1.0);
            let volume = rng.gen_range(50_000.0..150_000.0) * (2.0 - edge);

            candles.push(Candle::new(
                day + Duration::minutes(minute as i64),
                open,
                high,
                low,
                close,
                volume.round(),
            ));
            price = close;
        }

        emitted += 1;
        day += Duration::days(1);
    }

    candles
}
