use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;
use crate::gateway::{GatewayClient, HistoricalRequest, ProxyGateway, QuotesRequest};

/// Where the poller and historical feed get their data from.
///
/// Implemented in-process by [`ProxyGateway`] and over HTTP by [`GatewayClient`].
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quotes(&self, instrument_keys: &[String]) -> Result<Value>;

    async fn fetch_historical(&self, request: &HistoricalRequest) -> Result<Value>;
}

#[async_trait]
impl QuoteSource for ProxyGateway {
    async fn fetch_quotes(&self, instrument_keys: &[String]) -> Result<Value> {
        self.forward(QuotesRequest::new(instrument_keys.iter().cloned()))
            .await
    }

    async fn fetch_historical(&self, request: &HistoricalRequest) -> Result<Value> {
        self.forward(request.clone()).await
    }
}

#[async_trait]
impl QuoteSource for GatewayClient {
    async fn fetch_quotes(&self, instrument_keys: &[String]) -> Result<Value> {
        self.get_quotes(instrument_keys).await
    }

    async fn fetch_historical(&self, request: &HistoricalRequest) -> Result<Value> {
        self.get_historical_data(request).await
    }
}
