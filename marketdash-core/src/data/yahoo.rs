//! Yahoo Finance price source.
//!
//! Fetches daily OHLC bars from Yahoo's v8 chart API, one request per
//! ticker, and flattens them into long-format `PriceBar`s. Yahoo Finance has
//! no official API and is subject to unannounced format changes; CSV import
//! is the fallback when it is unavailable.

use super::http::HttpFetcher;
use super::provider::PriceSource;
use crate::config::HttpConfig;
use crate::domain::PriceBar;
use crate::error::SourceError;
use serde::Deserialize;

/// Yahoo Finance v8 chart API response.
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
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooPriceSource {
    http: HttpFetcher,
}

impl YahooPriceSource {
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
        })
    }

    /// Chart API URL for a ticker over the last `days` days.
    fn chart_url(ticker: &str, days: u32) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?range={days}d&interval=1d&includeAdjustedClose=false"
        )
    }

    /// Parse a chart API body into bars for `ticker`.
    pub(crate) fn parse_response(ticker: &str, body: &str) -> Result<Vec<PriceBar>, SourceError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
            SourceError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;

        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => SourceError::SymbolNotFound {
                symbol: ticker.to_string(),
            },
            Some(err) => SourceError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
            None => SourceError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::ResponseFormatChanged("result array is empty".into()))?;

        // A ticker with no trading history in range has no timestamps at all.
        let Some(timestamps) = data.timestamp else {
            return Err(SourceError::SymbolNotFound {
                symbol: ticker.to_string(),
            });
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| SourceError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();

            // Skip bars where every price is missing (holidays, halted sessions)
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                continue;
            }

            bars.push(
                PriceBar::new(
                    ticker,
                    date,
                    high.unwrap_or(f64::NAN),
                    low.unwrap_or(f64::NAN),
                    close.unwrap_or(f64::NAN),
                )
                .with_open(open.unwrap_or(f64::NAN)),
            );
        }

        if bars.is_empty() {
            return Err(SourceError::SymbolNotFound {
                symbol: ticker.to_string(),
            });
        }

        Ok(bars)
    }

    fn fetch_one(&self, ticker: &str, days: u32) -> Result<Vec<PriceBar>, SourceError> {
        let body = self.http.get_text(&Self::chart_url(ticker, days))?;
        Self::parse_response(ticker, &body)
    }
}

impl PriceSource for YahooPriceSource {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_prices(&self, tickers: &[String], days: u32) -> Result<Vec<PriceBar>, SourceError> {
        let mut bars = Vec::new();
        let mut last_error = None;
        let mut served = 0usize;

        for ticker in tickers {
            if !self.http.is_available() {
                last_error = Some(SourceError::CircuitBreakerTripped);
                break;
            }
            match self.fetch_one(ticker, days) {
                Ok(ticker_bars) => {
                    served += 1;
                    bars.extend(ticker_bars);
                }
                Err(e) => {
                    tracing::warn!(ticker = %ticker, error = %e, "price fetch failed, skipping ticker");
                    last_error = Some(e);
                }
            }
        }

        tracing::info!(served, requested = tickers.len(), days, "fetched price history");

        if served == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }
        Ok(bars)
    }
}
