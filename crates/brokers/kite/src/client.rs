use async_trait::async_trait;
use kitemcp_core::*;
use reqwest::{header, Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};

use crate::protocol::*;

/// Configuration for connecting to Kite Connect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KiteConfig {
    /// Public API key of the Kite Connect app.
    pub api_key: String,
    /// REST root (e.g. "https://api.kite.trade").
    pub api_url: String,
    /// Login page the operator is sent to.
    pub login_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl KiteConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: "https://api.kite.trade".to_string(),
            login_url: "https://kite.zerodha.com/connect/login".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Kite Connect REST client.
///
/// The access token is bound once, after the login handshake, and read by
/// every subsequent call.
pub struct KiteClient {
    config: KiteConfig,
    login_page: String,
    http: Client,
    access_token: OnceLock<String>,
}

impl KiteClient {
    pub fn new(config: KiteConfig) -> Result<Self, BrokerError> {
        let mut headers = header::HeaderMap::new();
        headers.insert("X-Kite-Version", header::HeaderValue::from_static(KITE_VERSION));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BrokerError::Configuration(e.to_string()))?;
        let login_page = login_url(&config.login_url, &config.api_key)?;

        Ok(Self {
            config,
            login_page,
            http,
            access_token: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &KiteConfig {
        &self.config
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BrokerError> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| BrokerError::Configuration(format!("invalid api url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| BrokerError::Configuration("api url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, method: Method, url: Url) -> Result<RequestBuilder, BrokerError> {
        let token = self.access_token.get().ok_or(BrokerError::NotAuthenticated)?;
        let value = format!("token {}:{}", self.config.api_key, token);
        Ok(self
            .http
            .request(method, url)
            .header(header::AUTHORIZATION, value))
    }

    async fn send(&self, request: RequestBuilder) -> Result<(u16, Vec<u8>), BrokerError> {
        let response = request
            .send()
            .await
            .map_err(|e| BrokerError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| BrokerError::Network(e.to_string()))?;
        Ok((status, body.to_vec()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, BrokerError> {
        let url = self.endpoint(segments)?;
        debug!(path = %url.path(), "GET");
        let request = self.authorized(Method::GET, url)?.query(query);
        let (status, body) = self.send(request).await?;
        decode_envelope(status, &body)
    }

    /// Instrument dumps are plain CSV on success and JSON envelopes on error.
    async fn get_csv<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, BrokerError> {
        let url = self.endpoint(segments)?;
        debug!(path = %url.path(), "GET csv");
        let request = self.authorized(Method::GET, url)?;
        let (status, body) = self.send(request).await?;
        if !(200..300).contains(&status) {
            return Err(decode_error(status, &body));
        }
        decode_csv(&body)
    }

    async fn quotes<T: DeserializeOwned + Keyed>(
        &self,
        segments: &[&str],
        instruments: &[String],
    ) -> Result<Vec<T>, BrokerError> {
        let query: Vec<(&str, String)> = instruments.iter().map(|i| ("i", i.clone())).collect();
        let map: BTreeMap<String, T> = self.get(segments, &query).await?;
        Ok(keyed_records(map))
    }
}

fn query_flag(on: bool) -> String {
    let flag = if on { "1" } else { "0" };
    flag.to_string()
}

#[async_trait]
impl BrokerClient for KiteClient {
    async fn holdings(&self) -> Result<Vec<Holding>, BrokerError> {
        self.get(&["portfolio", "holdings"], &[]).await
    }

    async fn auction_instruments(&self) -> Result<Vec<AuctionInstrument>, BrokerError> {
        self.get(&["portfolio", "holdings", "auctions"], &[]).await
    }

    async fn positions(&self) -> Result<Positions, BrokerError> {
        self.get(&["portfolio", "positions"], &[]).await
    }

    async fn order_margins(
        &self,
        mut orders: Vec<OrderMarginParam>,
    ) -> Result<Vec<OrderMargins>, BrokerError> {
        for order in &mut orders {
            order.exchange = order.exchange.to_uppercase();
        }
        let url = self.endpoint(&["margins", "orders"])?;
        debug!(path = %url.path(), orders = orders.len(), "POST");
        let request = self.authorized(Method::POST, url)?.json(&orders);
        let (status, body) = self.send(request).await?;
        decode_envelope(status, &body)
    }

    async fn quote(&self, instruments: &[String]) -> Result<Vec<Quote>, BrokerError> {
        self.quotes(&["quote"], instruments).await
    }

    async fn ltp(&self, instruments: &[String]) -> Result<Vec<Ltp>, BrokerError> {
        self.quotes(&["quote", "ltp"], instruments).await
    }

    async fn ohlc(&self, instruments: &[String]) -> Result<Vec<OhlcQuote>, BrokerError> {
        self.quotes(&["quote", "ohlc"], instruments).await
    }

    async fn historical_data(
        &self,
        params: HistoricalDataParams,
    ) -> Result<Vec<HistoricalCandle>, BrokerError> {
        let token = params.instrument_token.to_string();
        let query = [
            ("from", params.from.format(HISTORICAL_TIME_FORMAT).to_string()),
            ("to", params.to.format(HISTORICAL_TIME_FORMAT).to_string()),
            ("continuous", query_flag(params.continuous)),
            ("oi", query_flag(params.oi)),
        ];
        let segments = ["instruments", "historical", token.as_str(), params.interval.as_str()];
        let payload: CandlesPayload = self.get(&segments, &query).await?;
        parse_candles(payload.candles)
    }

    async fn instruments(&self) -> Result<Vec<Instrument>, BrokerError> {
        self.get_csv(&["instruments"]).await
    }

    async fn instruments_by_exchange(
        &self,
        exchange: &str,
    ) -> Result<Vec<Instrument>, BrokerError> {
        let exchange = exchange.to_uppercase();
        self.get_csv(&["instruments", exchange.as_str()]).await
    }

    async fn mf_instruments(&self) -> Result<Vec<MfInstrument>, BrokerError> {
        self.get_csv(&["mf", "instruments"]).await
    }

    async fn mf_orders(&self) -> Result<Vec<MfOrder>, BrokerError> {
        self.get(&["mf", "orders"], &[]).await
    }

    async fn mf_order_info(&self, order_id: &str) -> Result<MfOrder, BrokerError> {
        self.get(&["mf", "orders", order_id], &[]).await
    }

    async fn mf_sip_info(&self, sip_id: &str) -> Result<MfSipInfo, BrokerError> {
        self.get(&["mf", "sips", sip_id], &[]).await
    }

    async fn mf_holdings(&self) -> Result<Vec<MfHolding>, BrokerError> {
        self.get(&["mf", "holdings"], &[]).await
    }

    async fn mf_holding_info(&self, isin: &str) -> Result<Vec<MfHoldingBreakdown>, BrokerError> {
        self.get(&["mf", "holdings", isin], &[]).await
    }

    async fn mf_allotted_isins(&self) -> Result<Vec<String>, BrokerError> {
        self.get(&["mf", "allotments"], &[]).await
    }

    async fn user_profile(&self) -> Result<UserProfile, BrokerError> {
        self.get(&["user", "profile"], &[]).await
    }

    async fn user_margins(&self) -> Result<AllMargins, BrokerError> {
        self.get(&["user", "margins"], &[]).await
    }

    async fn user_segment_margins(&self, segment: &str) -> Result<Margins, BrokerError> {
        self.get(&["user", "margins", segment], &[]).await
    }
}

#[async_trait]
impl Authenticator for KiteClient {
    fn login_url(&self) -> String {
        self.login_page.clone()
    }

    async fn exchange_token(
        &self,
        request_token: &str,
        api_secret: &str,
    ) -> Result<UserSession, BrokerError> {
        let url = self.endpoint(&["session", "token"])?;
        let checksum = checksum(&self.config.api_key, request_token, api_secret);
        let form = [
            ("api_key", self.config.api_key.as_str()),
            ("request_token", request_token),
            ("checksum", checksum.as_str()),
        ];
        info!("Exchanging request token for an access token");
        let (status, body) = self.send(self.http.post(url).form(&form)).await?;
        decode_envelope(status, &body)
    }

    fn set_access_token(&self, access_token: &str) -> Result<(), BrokerError> {
        self.access_token
            .set(access_token.to_string())
            .map_err(|_| BrokerError::Configuration("access token already bound".to_string()))
    }
}
