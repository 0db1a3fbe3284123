//! Request variants the gateway forwards to the provider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ValidationError;

/// Interval used when a historical request does not name one.
pub const DEFAULT_INTERVAL: &str = "day";

/// Where a validated request goes on the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    /// Path relative to the provider base with segments already encoded.
    pub path: String,
    pub query: Vec<(String, String)>,
}

/// Capability shared by every forwardable request.
pub trait ProviderRequest {
    /// Reject malformed input before any credential lookup or network call.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Provider path and query for a request that passed `validate`.
    fn endpoint(&self) -> ProviderEndpoint;
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotesRequest {
    pub symbols: Vec<String>,
}

impl QuotesRequest {
    pub fn new<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

impl ProviderRequest for QuotesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.symbols.is_empty() {
            return Err(ValidationError::MissingField("symbols"));
        }
        if self.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(ValidationError::InvalidInput(
                "symbols must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }

    fn endpoint(&self) -> ProviderEndpoint {
        let csv = self
            .symbols
            .iter()
            .map(|s| s.trim())
            .collect::<Vec<_>>()
            .join(",");
        ProviderEndpoint {
            path: "/market-quote/quotes".to_string(),
            query: vec![("symbol".to_string(), csv)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRequest {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
}

impl HistoricalRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: None,
            from_date: None,
            to_date: None,
        }
    }

    pub fn interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    pub fn range(mut self, from_date: Option<String>, to_date: Option<String>) -> Self {
        self.from_date = from_date;
        self.to_date = to_date;
        self
    }

    /// The interval that will be sent, falling back to [`DEFAULT_INTERVAL`].
    pub fn effective_interval(&self) -> &str {
        self.interval
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .unwrap_or(DEFAULT_INTERVAL)
    }
}

impl ProviderRequest for HistoricalRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol"));
        }
        Ok(())
    }

    fn endpoint(&self) -> ProviderEndpoint {
        // Empty date segments mean the range is unbounded on that side.
        let date = |d: &Option<String>| d.as_deref().map(str::trim).map(segment).unwrap_or_default();
        ProviderEndpoint {
            path: format!(
                "/historical-candle/{}/{}/{}/{}",
                segment(self.symbol.trim()),
                segment(self.effective_interval()),
                date(&self.to_date),
                date(&self.from_date),
            ),
            query: Vec::new(),
        }
    }
}

/// `.` or `..`, including percent-encoded spellings such as `%2e%2E`.
fn is_dot_segment(part: &str) -> bool {
    match urlencoding::decode(part) {
        Ok(decoded) => decoded == "." || decoded == "..",
        Err(_) => false,
    }
}

/// Any provider GET endpoint with arbitrary query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericRequest {
    pub endpoint: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl GenericRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Build from browser-supplied JSON params. Scalars are stringified and
    /// `null` entries dropped; nested arrays or objects are rejected.
    pub fn from_json_params(
        endpoint: impl Into<String>,
        params: Option<Map<String, Value>>,
    ) -> Result<Self, ValidationError> {
        let mut converted = BTreeMap::new();
        for (key, value) in params.unwrap_or_default() {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ValidationError::InvalidInput(format!(
                        "param '{}' must be a string, number or boolean",
                        key
                    )))
                }
            };
            converted.insert(key, value);
        }
        Ok(Self {
            endpoint: endpoint.into(),
            params: converted,
        })
    }
}

impl ProviderRequest for GenericRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ValidationError::MissingField("endpoint"));
        }
        if endpoint.contains("://") || endpoint.starts_with("//") {
            return Err(ValidationError::InvalidInput(
                "endpoint must be a provider path, not an absolute URL".to_string(),
            ));
        }
        if !endpoint.starts_with('/') {
            return Err(ValidationError::InvalidInput(
                "endpoint must start with '/'".to_string(),
            ));
        }
        if endpoint.contains('?') || endpoint.contains('#') {
            return Err(ValidationError::InvalidInput(
                "endpoint must not carry a query string; use params".to_string(),
            ));
        }
        if endpoint.contains('\\') || endpoint.split('/').any(is_dot_segment) {
            return Err(ValidationError::InvalidInput(
                "endpoint must not contain dot segments".to_string(),
            ));
        }
        Ok(())
    }

    fn endpoint(&self) -> ProviderEndpoint {
        ProviderEndpoint {
            path: self.endpoint.trim().to_string(),
            query: self
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// One of the three forwardable request shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRequest {
    Quotes(QuotesRequest),
    Historical(HistoricalRequest),
    Generic(GenericRequest),
}

impl ProxyRequest {
    pub fn label(&self) -> &'static str {
        match self {
            ProxyRequest::Quotes(_) => "quotes",
            ProxyRequest::Historical(_) => "historical",
            ProxyRequest::Generic(_) => "market-data",
        }
    }
}

impl ProviderRequest for ProxyRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ProxyRequest::Quotes(r) => r.validate(),
            ProxyRequest::Historical(r) => r.validate(),
            ProxyRequest::Generic(r) => r.validate(),
        }
    }

    fn endpoint(&self) -> ProviderEndpoint {
        match self {
            ProxyRequest::Quotes(r) => r.endpoint(),
            ProxyRequest::Historical(r) => r.endpoint(),
            ProxyRequest::Generic(r) => r.endpoint(),
        }
    }
}

impl From<QuotesRequest> for ProxyRequest {
    fn from(r: QuotesRequest) -> Self {
        ProxyRequest::Quotes(r)
    }
}

impl From<HistoricalRequest> for ProxyRequest {
    fn from(r: HistoricalRequest) -> Self {
        ProxyRequest::Historical(r)
    }
}

impl From<GenericRequest> for ProxyRequest {
    fn from(r: GenericRequest) -> Self {
        ProxyRequest::Generic(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quotes_join_symbols_with_commas() {
        let endpoint = QuotesRequest::new(["NSE_EQ|INE002A01018", "NSE_INDEX|Nifty 50"]).endpoint();
        assert_eq!(endpoint.path, "/market-quote/quotes");
        assert_eq!(
            endpoint.query,
            vec![(
                "symbol".to_string(),
                "NSE_EQ|INE002A01018,NSE_INDEX|Nifty 50".to_string()
            )]
        );
    }

    #[test]
    fn quotes_reject_empty_and_blank_symbols() {
        assert_eq!(
            QuotesRequest::new(Vec::<String>::new()).validate(),
            Err(ValidationError::MissingField("symbols"))
        );
        assert!(matches!(
            QuotesRequest::new(["TCS", " "]).validate(),
            Err(ValidationError::InvalidInput(_))
        ));
    }

    #[test]
    fn historical_defaults_to_day_with_unbounded_dates() {
        let endpoint = HistoricalRequest::new("NSE_EQ|INE002A01018").endpoint();
        assert_eq!(
            endpoint.path,
            "/historical-candle/NSE_EQ%7CINE002A01018/day//"
        );
    }

    #[test]
    fn historical_places_to_before_from() {
        let endpoint = HistoricalRequest::new("NSE_INDEX|Nifty 50")
            .interval("30minute")
            .range(Some("2024-01-01".into()), Some("2024-01-31".into()))
            .endpoint();
        assert_eq!(
            endpoint.path,
            "/historical-candle/NSE_INDEX%7CNifty%2050/30minute/2024-01-31/2024-01-01"
        );
    }

    #[test]
    fn historical_blank_interval_falls_back_to_day() {
        let request = HistoricalRequest::new("X").interval("  ");
        assert_eq!(request.effective_interval(), "day");
    }

    #[test]
    fn historical_requires_symbol() {
        assert_eq!(
            HistoricalRequest::new("").validate(),
            Err(ValidationError::MissingField("symbol"))
        );
    }

    #[test]
    fn generic_endpoint_must_be_a_relative_provider_path() {
        assert!(GenericRequest::new("/option/contract").validate().is_ok());
        assert_eq!(
            GenericRequest::new("  ").validate(),
            Err(ValidationError::MissingField("endpoint"))
        );
        for bad in [
            "option/contract",
            "https://evil.example.com/steal",
            "//evil.example.com",
            "/option/contract?x=1",
            "/../login",
            "/%2e%2e/login/authorization/token",
            "/.%2e/login",
            "/%2E./login",
            "/option/./contract",
            "/..\\login",
        ] {
            assert!(
                matches!(GenericRequest::new(bad).validate(), Err(ValidationError::InvalidInput(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn generic_params_are_stringified_and_nulls_dropped() {
        let params = json!({
            "instrument_key": "NSE_FO|12345",
            "expiry_date": null,
            "limit": 50,
            "include_greeks": true
        });
        let request = GenericRequest::from_json_params(
            "/option/chain",
            params.as_object().cloned(),
        )
        .unwrap();
        assert_eq!(request.params.len(), 3);
        assert_eq!(request.params["limit"], "50");
        assert_eq!(request.params["include_greeks"], "true");
        assert!(!request.params.contains_key("expiry_date"));
    }

    #[test]
    fn generic_params_reject_nested_values() {
        let params = json!({"keys": ["a", "b"]});
        assert!(GenericRequest::from_json_params("/x", params.as_object().cloned()).is_err());
    }

    #[test]
    fn proxy_request_dispatches_to_variant() {
        let request: ProxyRequest = GenericRequest::new("/market/status")
            .param("exchange", "NSE")
            .into();
        assert_eq!(request.label(), "market-data");
        assert_eq!(
            request.endpoint().query,
            vec![("exchange".to_string(), "NSE".to_string())]
        );
    }
}
