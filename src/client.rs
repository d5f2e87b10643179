//! JSON-over-HTTPS client of the upstream analytics API.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::ClientConfig,
    error::{ApiError, ConfigError},
    table::{self, Record, SchemaKind, Table},
    types::Query,
};

/// Header carrying the API key, header names are case-insensitive.
pub const API_KEY_HEADER: &str = "apikey";

/// Endpoint paths, relative to the base URL.
pub mod path {
    pub const SMART_MONEY_INFLOWS: &str = "/smart-money/inflows";
    pub const SMART_MONEY_HOLDINGS: &str = "/smart-money/holdings";
    pub const SMART_MONEY_NETFLOW: &str = "/smart-money/netflow";
    pub const SMART_MONEY_DEX_TRADES: &str = "/smart-money/dex-trades";
    pub const SMART_MONEY_DCAS: &str = "/smart-money/dcas";
    pub const TOKEN_SCREENER: &str = "/token-screener";
    pub const FLOW_INTELLIGENCE: &str = "/tgm/flow-intelligence";
    pub const TOKEN_FLOWS: &str = "/tgm/flows";
}

/// Upstream API client.
///
/// Every call is a single POST with a fixed timeout, without retries.
#[derive(Clone, Debug)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(config.api_key())
            .map_err(|_| ApiError::Config(ConfigError::InvalidApiKey))?;
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;
        Ok(Self { config, http })
    }

    /// Client configured from the environment, see [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Posts `payload` to `path` and returns the unwrapped records.
    ///
    /// Non-2xx responses fail with [`ApiError::Status`]. Bodies that are not
    /// JSON or not in a known envelope yield no records.
    pub async fn call<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Vec<Record>, ApiError> {
        let url = self.endpoint_url(path)?;
        debug!(%url, "posting query");

        let resp = self.http.post(url).json(payload).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }

        let records = match serde_json::from_str::<Value>(&body) {
            Ok(value) => unwrap_envelope(value),
            Err(err) => {
                warn!(path, %err, "response body is not JSON, treating as empty");
                Vec::new()
            }
        };
        debug!(path, records = records.len(), "query completed");
        Ok(records)
    }

    /// Raw records of the endpoint serving `kind`.
    ///
    /// Token candles use the configured candles path.
    pub async fn records<P: Serialize>(
        &self,
        kind: SchemaKind,
        query: &Query<P>,
    ) -> Result<Vec<Record>, ApiError> {
        let path = match endpoint_path(kind) {
            Some(path) => path.to_string(),
            None => self.candles_path(None)?,
        };
        self.call(&path, query).await
    }

    /// Queries the endpoint serving `kind` and normalizes the response.
    pub async fn fetch<P: Serialize>(
        &self,
        kind: SchemaKind,
        query: &Query<P>,
    ) -> Result<Table, ApiError> {
        let records = self.records(kind, query).await?;
        Ok(table::normalize_records(kind, records))
    }

    pub async fn smart_money_inflows<P: Serialize>(
        &self,
        query: &Query<P>,
    ) -> Result<Vec<Record>, ApiError> {
        self.call(path::SMART_MONEY_INFLOWS, query).await
    }

    pub async fn smart_money_holdings<P: Serialize>(
        &self,
        query: &Query<P>,
    ) -> Result<Vec<Record>, ApiError> {
        self.call(path::SMART_MONEY_HOLDINGS, query).await
    }

    pub async fn smart_money_netflow<P: Serialize>(
        &self,
        query: &Query<P>,
    ) -> Result<Vec<Record>, ApiError> {
        self.call(path::SMART_MONEY_NETFLOW, query).await
    }

    pub async fn smart_money_dex_trades<P: Serialize>(
        &self,
        query: &Query<P>,
    ) -> Result<Vec<Record>, ApiError> {
        self.call(path::SMART_MONEY_DEX_TRADES, query).await
    }

    pub async fn smart_money_dca_events<P: Serialize>(
        &self,
        query: &Query<P>,
    ) -> Result<Vec<Record>, ApiError> {
        self.call(path::SMART_MONEY_DCAS, query).await
    }

    pub async fn token_screener<P: Serialize>(
        &self,
        query: &Query<P>,
    ) -> Result<Vec<Record>, ApiError> {
        self.call(path::TOKEN_SCREENER, query).await
    }

    pub async fn flow_intelligence<P: Serialize>(
        &self,
        query: &Query<P>,
    ) -> Result<Vec<Record>, ApiError> {
        self.call(path::FLOW_INTELLIGENCE, query).await
    }

    /// Token flows, used as price history.
    pub async fn token_flows<P: Serialize>(
        &self,
        query: &Query<P>,
    ) -> Result<Vec<Record>, ApiError> {
        self.call(path::TOKEN_FLOWS, query).await
    }

    /// OHLCV candles of a token.
    ///
    /// The endpoint path is `path` if given, the configured candles path
    /// otherwise. Fails with [`ConfigError::MissingCandlesPath`] if neither
    /// is set.
    pub async fn token_candles<P: Serialize>(
        &self,
        query: &Query<P>,
        path: Option<&str>,
    ) -> Result<Vec<Record>, ApiError> {
        let path = self.candles_path(path)?;
        self.call(&path, query).await
    }

    fn candles_path(&self, path: Option<&str>) -> Result<String, ApiError> {
        let path = path
            .or(self.config.candles_path())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingCandlesPath)?;
        Ok(if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        })
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.config.base_url().as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| ApiError::InvalidPath(format!("{path}: {e}")))
    }
}

/// Fixed endpoint path serving records of `kind`.
///
/// `None` for token candles, whose path is configured.
pub fn endpoint_path(kind: SchemaKind) -> Option<&'static str> {
    match kind {
        SchemaKind::Inflows => Some(path::SMART_MONEY_INFLOWS),
        SchemaKind::Holdings => Some(path::SMART_MONEY_HOLDINGS),
        SchemaKind::Screener => Some(path::TOKEN_SCREENER),
        SchemaKind::FlowIntelligence => Some(path::FLOW_INTELLIGENCE),
        SchemaKind::NetFlow => Some(path::SMART_MONEY_NETFLOW),
        SchemaKind::DexTrades => Some(path::SMART_MONEY_DEX_TRADES),
        SchemaKind::DcaEvents => Some(path::SMART_MONEY_DCAS),
        SchemaKind::TokenFlows => Some(path::TOKEN_FLOWS),
        SchemaKind::TokenCandles => None,
    }
}

/// Extracts records from a response envelope.
///
/// `{"data": [...]}` and bare arrays are unwrapped, anything else yields no
/// records. Entries that are not JSON objects are dropped.
pub fn unwrap_envelope(value: Value) -> Vec<Record> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                warn!(found = %other, "`data` is not a list, treating as empty");
                return Vec::new();
            }
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    let total = items.len();
    let records: Vec<Record> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if records.len() != total {
        warn!(dropped = total - records.len(), "dropped non-object records");
    }
    records
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records(value: Value) -> Value {
        Value::Array(unwrap_envelope(value).into_iter().map(Value::Object).collect())
    }

    #[test]
    fn test_unwrap_envelope() {
        assert_eq!(records(json!({"data": [{"a": 1}]})), json!([{"a": 1}]));
        assert_eq!(records(json!([{"a": 1}])), json!([{"a": 1}]));
        assert_eq!(records(json!({"status": "ok"})), json!([]));
        assert_eq!(records(json!({"data": {"a": 1}})), json!([]));
        assert_eq!(records(json!("ok")), json!([]));
        assert_eq!(records(json!([{"a": 1}, 2, null])), json!([{"a": 1}]));
    }

    #[test]
    fn test_candles_path() {
        let client = Client::new(ClientConfig::new("key").unwrap()).unwrap();
        assert!(matches!(
            client.candles_path(None),
            Err(ApiError::Config(ConfigError::MissingCandlesPath))
        ));
        assert_eq!(client.candles_path(Some("tgm/candles")).unwrap(), "/tgm/candles");

        let client = Client::new(
            ClientConfig::new("key").unwrap().with_candles_path("/tgm/ohlcv"),
        )
        .unwrap();
        assert_eq!(client.candles_path(None).unwrap(), "/tgm/ohlcv");
        assert_eq!(client.candles_path(Some(" x ")).unwrap(), "/x");
    }

    #[test]
    fn test_invalid_api_key() {
        let config = ClientConfig::new("key\nwith newline").unwrap();
        assert!(matches!(
            Client::new(config),
            Err(ApiError::Config(ConfigError::InvalidApiKey))
        ));
    }

    #[test]
    fn test_endpoint_url() {
        let client = Client::new(ClientConfig::new("key").unwrap()).unwrap();
        assert_eq!(
            client.endpoint_url(path::TOKEN_SCREENER).unwrap().as_str(),
            "https://api.nansen.ai/api/beta/token-screener"
        );
    }

    #[test]
    fn test_endpoint_paths() {
        for kind in SchemaKind::ALL {
            assert_eq!(endpoint_path(kind).is_none(), kind == SchemaKind::TokenCandles);
        }
    }
}
