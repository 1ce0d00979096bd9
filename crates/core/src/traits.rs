use crate::models::*;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Broker Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during broker operations.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("{error_type}: {message}")]
    Api { error_type: String, message: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("No access token bound to the broker client")]
    NotAuthenticated,
}

// ---------------------------------------------------------------------------
// Broker Client Trait
// ---------------------------------------------------------------------------

/// Read-only access to a brokerage account.
///
/// One method per supported endpoint. Implementations return records in the
/// order the broker sent them.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Equity holdings in the demat account.
    async fn holdings(&self) -> Result<Vec<Holding>, BrokerError>;

    /// Holdings available for the current auction session.
    async fn auction_instruments(&self) -> Result<Vec<AuctionInstrument>, BrokerError>;

    /// Day and net positions.
    async fn positions(&self) -> Result<Positions, BrokerError>;

    /// Margin requirements for a basket of orders.
    async fn order_margins(
        &self,
        orders: Vec<OrderMarginParam>,
    ) -> Result<Vec<OrderMargins>, BrokerError>;

    /// Full quotes for `exchange:tradingsymbol` instruments.
    async fn quote(&self, instruments: &[String]) -> Result<Vec<Quote>, BrokerError>;

    /// Last traded prices for `exchange:tradingsymbol` instruments.
    async fn ltp(&self, instruments: &[String]) -> Result<Vec<Ltp>, BrokerError>;

    /// OHLC quotes for `exchange:tradingsymbol` instruments.
    async fn ohlc(&self, instruments: &[String]) -> Result<Vec<OhlcQuote>, BrokerError>;

    /// Historical candles for one instrument token.
    async fn historical_data(
        &self,
        params: HistoricalDataParams,
    ) -> Result<Vec<HistoricalCandle>, BrokerError>;

    /// Full instrument dump across exchanges.
    async fn instruments(&self) -> Result<Vec<Instrument>, BrokerError>;

    /// Instrument dump for one exchange.
    async fn instruments_by_exchange(&self, exchange: &str)
        -> Result<Vec<Instrument>, BrokerError>;

    async fn mf_instruments(&self) -> Result<Vec<MfInstrument>, BrokerError>;

    async fn mf_orders(&self) -> Result<Vec<MfOrder>, BrokerError>;

    async fn mf_order_info(&self, order_id: &str) -> Result<MfOrder, BrokerError>;

    async fn mf_sip_info(&self, sip_id: &str) -> Result<MfSipInfo, BrokerError>;

    async fn mf_holdings(&self) -> Result<Vec<MfHolding>, BrokerError>;

    async fn mf_holding_info(&self, isin: &str) -> Result<Vec<MfHoldingBreakdown>, BrokerError>;

    async fn mf_allotted_isins(&self) -> Result<Vec<String>, BrokerError>;

    async fn user_profile(&self) -> Result<UserProfile, BrokerError>;

    /// Margins across all segments.
    async fn user_margins(&self) -> Result<AllMargins, BrokerError>;

    /// Margins for a single segment (`equity` or `commodity`).
    async fn user_segment_margins(&self, segment: &str) -> Result<Margins, BrokerError>;
}

// ---------------------------------------------------------------------------
// Authenticator Trait
// ---------------------------------------------------------------------------

/// The token-exchange half of the broker's login flow.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// URL the operator opens to approve access.
    fn login_url(&self) -> String;

    /// Exchange an authorization code for a session.
    async fn exchange_token(
        &self,
        request_token: &str,
        api_secret: &str,
    ) -> Result<UserSession, BrokerError>;

    /// Bind the access token used for every subsequent call.
    fn set_access_token(&self, access_token: &str) -> Result<(), BrokerError>;
}
