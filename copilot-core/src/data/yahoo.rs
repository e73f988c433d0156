//! Yahoo Finance intraday provider.
//!
//! Fetches 1m/5m/15m candles from Yahoo's v8 chart API. Every request first passes
//! the shared rate limiter. Failed requests are retried with exponential backoff.
//! Timestamps are placed in the exchange offset reported by the response
//! (`meta.gmtoffset`) so VWAP sessions follow the exchange date.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! The CSV path is the fallback when Yahoo is unavailable.

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use super::rate_limiter::RateLimiter;
use crate::domain::{Candle, Timeframe};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(rename = "gmtoffset")]
    gmt_offset: Option<i32>,
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    rate_limiter: Arc<RateLimiter>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(rate_limiter: Arc<RateLimiter>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            rate_limiter,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    fn chart_url(symbol: &str, timeframe: Timeframe, range: &str) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?range={range}&interval={timeframe}&includePrePost=false"
        )
    }

    /// Parse the chart API response into candles in the exchange offset.
    fn parse_response(
        symbol: &str,
        timeframe: Timeframe,
        resp: ChartResponse,
    ) -> Result<Vec<Candle>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let offset_secs = data.meta.as_ref().and_then(|m| m.gmt_offset).unwrap_or(0);
        let offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("invalid gmtoffset: {offset_secs}"))
        })?;
        if let Some(tz) = data.meta.as_ref().and_then(|m| m.exchange_timezone_name.as_deref()) {
            tracing::debug!(symbol, timezone = tz, offset_secs, "exchange offset");
        }

        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::NoData {
                symbol: symbol.to_string(),
                timeframe,
            })?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut candles = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp = DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.with_timezone(&offset))
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
            // Intraday responses carry null rows for halted or empty minutes
            let (Some(open), Some(high), Some(low), Some(close)) = (
                field(&quote.open),
                field(&quote.high),
                field(&quote.low),
                field(&quote.close),
            ) else {
                continue;
            };
            let volume = field(&quote.volume).unwrap_or(0.0);

            candles.push(Candle::new(timestamp, open, high, low, close, volume));
        }

        if candles.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                timeframe,
            });
        }

        Ok(candles)
    }

    /// Execute the request with retry, gated by the rate limiter.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: &str,
    ) -> Result<Vec<Candle>, DataError> {
        let url = Self::chart_url(symbol, timeframe, range);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::warn!(
                    symbol,
                    %timeframe,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying Yahoo request"
                );
                std::thread::sleep(delay);
            }

            self.rate_limiter.acquire()?;

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        return Err(DataError::Blocked);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(DataError::AuthenticationRequired(
                            "Yahoo Finance requires authentication".into(),
                        ));
                    }

                    if !status.is_success() {
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;

                    return Self::parse_response(symbol, timeframe, chart);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        range: &str,
    ) -> Result<FetchResult, DataError> {
        let candles = self.fetch_with_retry(symbol, timeframe, range)?;
        tracing::info!(symbol, %timeframe, candles = candles.len(), "fetched from Yahoo");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            timeframe,
            candles,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.rate_limiter.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "gmtoffset": -14400, "exchangeTimezoneName": "America/New_York" },
                "timestamp": [1717421400, 1717421460, 1717421520],
                "indicators": { "quote": [{
                    "open":   [530.0, null, 530.4],
                    "high":   [530.6, null, 530.9],
                    "low":    [529.8, null, 530.2],
                    "close":  [530.3, null, 530.8],
                    "volume": [120000, null, 95000]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_candles_in_exchange_offset() {
        let resp: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        let candles = YahooProvider::parse_response("SPY", Timeframe::M1, resp).unwrap();
        // null row skipped
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp.to_rfc3339(), "2024-06-03T09:30:00-04:00");
        assert_eq!(candles[0].volume, 120000.0);
        assert_eq!(candles[1].close, 530.8);
    }

    #[test]
    fn not_found_maps_to_symbol_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let err = YahooProvider::parse_response("NOPE", Timeframe::M5, resp).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn missing_timestamps_is_no_data() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":-14400},"indicators":{"quote":[{"open":[],"high":[],"low":[],"close":[],"volume":[]}]}}],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let err = YahooProvider::parse_response("SPY", Timeframe::M15, resp).unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }

    #[test]
    fn chart_url_uses_interval_string() {
        let url = YahooProvider::chart_url("SPY", Timeframe::M15, "5d");
        assert!(url.contains("/chart/SPY?range=5d&interval=15m"));
    }
}
