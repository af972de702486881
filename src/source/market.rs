//! Market: last price and change from the previous close for the major
//! indexes plus configured symbols.

use super::{DataSource, FormatError, HttpClient, SourceError};
use crate::holidays::is_business_day;
use crate::time::Clock;
use crate::topic::Topic;
use chrono::{DateTime, Local, NaiveTime};
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Dow Jones Industrial Average and S&P 500, always shown first.
pub const INDEX_SYMBOLS: [&str; 2] = ["^DJI", "^SPX"];

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: f64,
    chart_previous_close: f64,
}

/// Check whether `now` falls in regular trading hours, 09:30 to 16:00 local.
pub fn is_business_hours(now: &DateTime<Local>) -> bool {
    let time = now.time();
    let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN);
    let close = NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN);
    open <= time && time < close
}

/// Check whether the exchanges are open at `now`.
pub fn is_market_open(now: &DateTime<Local>) -> bool {
    is_business_day(now.date_naive()) && is_business_hours(now)
}

/// Format a price change: explicit `+` only for strictly positive deltas.
pub fn format_delta(delta: f64) -> String {
    if delta <= 0.0 {
        format!("{delta:.2}")
    } else {
        format!("+{delta:.2}")
    }
}

/// Market data source.
pub struct Market {
    client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    symbols: Vec<String>,
}

impl Market {
    /// Create a market source for the index symbols followed by `extra`.
    ///
    /// Duplicates are dropped; first occurrence wins.
    pub fn new(client: Arc<dyn HttpClient>, clock: Arc<dyn Clock>, extra: &[String]) -> Self {
        let mut symbols: Vec<String> = Vec::with_capacity(INDEX_SYMBOLS.len() + extra.len());
        for symbol in INDEX_SYMBOLS.iter().copied().chain(extra.iter().map(String::as_str)) {
            if !symbols.iter().any(|s| s == symbol) {
                symbols.push(symbol.to_string());
            }
        }
        Self {
            client,
            clock,
            symbols,
        }
    }

    /// Symbols in display order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Current price and reference (previous close) for one symbol.
    fn quote(&self, symbol: &str) -> Result<(f64, f64), SourceError> {
        let url = format!("{CHART_URL}/{}", urlencoding::encode(symbol));
        let response: ChartResponse = serde_json::from_value(self.client.get_json(&url)?)?;
        let meta = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| FormatError(format!("no chart result for {symbol}")))?;
        Ok((meta.regular_market_price, meta.chart_previous_close))
    }
}

impl DataSource for Market {
    fn topic(&self) -> Topic {
        Topic::Market
    }

    fn fetch(&mut self) -> Result<String, SourceError> {
        let mut line = if is_market_open(&self.clock.now()) {
            String::from("* Market update *")
        } else {
            String::from("* Markets are closed *")
        };

        for symbol in &self.symbols {
            let (price, reference) = self.quote(symbol)?;
            let _ = write!(line, "  {symbol}: {price:.2}/{}", format_delta(price - reference));
        }
        Ok(line)
    }
}
