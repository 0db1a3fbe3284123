use std::sync::Arc;

use log::debug;
use serde_json::Value;
use tokio::sync::Mutex;

use super::source::QuoteSource;
use crate::errors::Result;
use crate::gateway::HistoricalRequest;
use crate::upstox::instrument_key;

/// Candle data for the currently selected symbol/interval/range.
///
/// A request is issued only when the selection changes; re-selecting the same
/// range returns the cached payload. Failures are returned to the caller and
/// not cached.
pub struct HistoricalFeed {
    source: Arc<dyn QuoteSource>,
    current: Mutex<Option<(HistoricalRequest, Value)>>,
}

impl HistoricalFeed {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            current: Mutex::new(None),
        }
    }

    pub async fn select(&self, selection: HistoricalRequest) -> Result<Value> {
        let selection = normalize(selection);
        let mut current = self.current.lock().await;

        if let Some((cached_for, data)) = current.as_ref() {
            if *cached_for == selection {
                return Ok(data.clone());
            }
        }

        debug!(
            "[Poller] Loading candles for {} ({})",
            selection.symbol,
            selection.effective_interval()
        );
        let data = self.source.fetch_historical(&selection).await?;
        *current = Some((selection, data.clone()));
        Ok(data)
    }
}

fn normalize(selection: HistoricalRequest) -> HistoricalRequest {
    let interval = selection.effective_interval().to_string();
    HistoricalRequest {
        symbol: instrument_key(selection.symbol.trim()).to_string(),
        interval: Some(interval),
        from_date: selection.from_date.filter(|d| !d.trim().is_empty()),
        to_date: selection.to_date.filter(|d| !d.trim().is_empty()),
    }
}
