//! Candle CSV files.
//!
//! Header: `timestamp,open,high,low,close,volume`, timestamps in RFC 3339 with
//! the exchange offset. Rows must be sane and strictly increasing in time.

use super::provider::DataError;
use crate::domain::Candle;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut candles: Vec<Candle> = Vec::new();

    for (row, record) in rdr.deserialize::<Candle>().enumerate() {
        let candle = record?;
        // +2: one for the header, one for 1-based numbering
        let line = row + 2;
        if !candle.is_sane() {
            return Err(DataError::ValidationError(format!(
                "line {line}: inconsistent OHLCV at {}",
                candle.timestamp
            )));
        }
        if let Some(prev) = candles.last() {
            if candle.timestamp <= prev.timestamp {
                return Err(DataError::ValidationError(format!(
                    "line {line}: timestamp {} does not increase",
                    candle.timestamp
                )));
            }
        }
        candles.push(candle);
    }

    Ok(candles)
}

pub fn write_candles<W: Write>(writer: W, candles: &[Candle]) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for candle in candles {
        wtr.serialize(candle)?;
    }
    wtr.flush()
        .map_err(|e| DataError::Csv(format!("flush failed: {e}")))?;
    Ok(())
}

pub fn read_candles_csv(path: &Path) -> Result<Vec<Candle>, DataError> {
    let file = File::open(path)
        .map_err(|e| DataError::Csv(format!("cannot open {}: {e}", path.display())))?;
    read_candles(file)
}

pub fn write_candles_csv(path: &Path, candles: &[Candle]) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| DataError::Csv(format!("cannot create {}: {e}", parent.display())))?;
    }
    let file = File::create(path)
        .map_err(|e| DataError::Csv(format!("cannot create {}: {e}", path.display())))?;
    write_candles(file, candles)
}
