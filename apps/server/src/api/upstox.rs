//! Upstox gateway endpoints: authorization-code exchange, credential status and
//! the authenticated market-data proxy.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::error::{ApiResult, ErrorBody};
use crate::main_lib::AppState;
use crate::models::{
    AuthUrlResponse, CodeBody, ExchangeResponse, HistoricalBody, InstrumentsResponse,
    MarketDataBody, QuotesBody, StatusResponse,
};
use dalal_core::gateway::{GenericRequest, HistoricalRequest, QuotesRequest};
use dalal_core::upstox::instrument_table;

#[utoipa::path(
    post,
    path = "/api/v1/upstox/oauth",
    request_body = CodeBody,
    responses(
        (status = 200, body = ExchangeResponse),
        (status = 400, body = ErrorBody),
        (status = 500, description = "OAuth settings missing", body = ErrorBody),
        (status = 502, description = "Provider rejected the code", body = ErrorBody)
    )
)]
pub async fn exchange_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CodeBody>, JsonRejection>,
) -> ApiResult<Json<ExchangeResponse>> {
    let Json(body) = payload?;
    let code = body.code.unwrap_or_default();
    let outcome = state.exchanger.exchange_code(&code).await?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/upstox/auth-url",
    responses((status = 200, body = AuthUrlResponse), (status = 500, body = ErrorBody))
)]
pub async fn authorization_url(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AuthUrlResponse>> {
    let url = state.exchanger.authorization_url()?;
    Ok(Json(AuthUrlResponse { url }))
}

#[utoipa::path(
    get,
    path = "/api/v1/upstox/status",
    responses((status = 200, body = StatusResponse), (status = 500, body = ErrorBody))
)]
pub async fn credential_status(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StatusResponse>> {
    let status = state.gateway.credential_status()?;
    Ok(Json(status.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/upstox/quotes",
    request_body = QuotesBody,
    responses(
        (status = 200, description = "Provider JSON, relayed unchanged"),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 502, body = ErrorBody)
    )
)]
pub async fn quotes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuotesBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload?;
    let data = state.gateway.forward(QuotesRequest::from(body)).await?;
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/api/v1/upstox/historical",
    request_body = HistoricalBody,
    responses(
        (status = 200, description = "Provider JSON, relayed unchanged"),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 502, body = ErrorBody)
    )
)]
pub async fn historical(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HistoricalBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload?;
    let data = state.gateway.forward(HistoricalRequest::from(body)).await?;
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/api/v1/upstox/market-data",
    request_body = MarketDataBody,
    responses(
        (status = 200, description = "Provider JSON, relayed unchanged"),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 502, body = ErrorBody)
    )
)]
pub async fn market_data(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MarketDataBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload?;
    let request = GenericRequest::try_from(body).map_err(dalal_core::Error::from)?;
    let data = state.gateway.forward(request).await?;
    Ok(Json(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/upstox/instruments",
    responses((status = 200, body = InstrumentsResponse))
)]
pub async fn instruments() -> Json<InstrumentsResponse> {
    let instruments = instrument_table()
        .into_iter()
        .map(|(ticker, key)| (ticker.to_string(), key.to_string()))
        .collect();
    Json(InstrumentsResponse { instruments })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upstox/oauth", post(exchange_code))
        .route("/upstox/auth-url", get(authorization_url))
        .route("/upstox/status", get(credential_status))
        .route("/upstox/quotes", post(quotes))
        .route("/upstox/historical", post(historical))
        .route("/upstox/market-data", post(market_data))
        .route("/upstox/instruments", get(instruments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn instruments_lists_the_dashboard_tickers() {
        let Json(body) = instruments().await;
        assert_eq!(
            body.instruments.get("RELIANCE").map(String::as_str),
            Some("NSE_EQ|INE002A01018")
        );
    }
}
