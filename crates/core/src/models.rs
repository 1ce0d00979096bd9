use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::describable;

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// Margin trading facility details attached to a holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MtfHolding {
    pub quantity: i64,
    pub used_quantity: i64,
    pub average_price: Decimal,
    pub value: Decimal,
    pub initial_margin: Decimal,
}

describable!(MtfHolding {
    quantity,
    used_quantity,
    average_price,
    value,
    initial_margin,
});

/// A long-term equity holding in the demat account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Holding {
    pub tradingsymbol: String,
    pub exchange: String,
    pub instrument_token: u64,
    pub isin: String,
    pub product: String,
    pub price: Decimal,
    pub used_quantity: i64,
    pub quantity: i64,
    pub t1_quantity: i64,
    pub realised_quantity: i64,
    pub authorised_quantity: i64,
    pub authorised_date: Option<String>,
    pub opening_quantity: i64,
    pub collateral_quantity: i64,
    pub collateral_type: Option<String>,
    pub discrepancy: bool,
    pub average_price: Decimal,
    pub last_price: Decimal,
    pub close_price: Decimal,
    pub pnl: Decimal,
    pub day_change: Decimal,
    pub day_change_percentage: Decimal,
    pub mtf: MtfHolding,
}

describable!(Holding {
    tradingsymbol,
    exchange,
    instrument_token,
    isin,
    product,
    price,
    used_quantity,
    quantity,
    t1_quantity,
    realised_quantity,
    authorised_quantity,
    authorised_date,
    opening_quantity,
    collateral_quantity,
    collateral_type,
    discrepancy,
    average_price,
    last_price,
    close_price,
    pnl,
    day_change,
    day_change_percentage,
    mtf,
});

/// A holding that is up for the current auction session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionInstrument {
    pub tradingsymbol: String,
    pub exchange: String,
    pub instrument_token: u64,
    pub isin: String,
    pub product: String,
    pub price: Decimal,
    pub quantity: i64,
    pub t1_quantity: i64,
    pub realised_quantity: i64,
    pub authorised_quantity: i64,
    pub authorised_date: Option<String>,
    pub opening_quantity: i64,
    pub collateral_quantity: i64,
    pub collateral_type: Option<String>,
    pub discrepancy: bool,
    pub average_price: Decimal,
    pub last_price: Decimal,
    pub close_price: Decimal,
    pub pnl: Decimal,
    pub day_change: Decimal,
    pub day_change_percentage: Decimal,
    pub auction_number: String,
}

describable!(AuctionInstrument {
    tradingsymbol,
    exchange,
    instrument_token,
    isin,
    product,
    price,
    quantity,
    t1_quantity,
    realised_quantity,
    authorised_quantity,
    authorised_date,
    opening_quantity,
    collateral_quantity,
    collateral_type,
    discrepancy,
    average_price,
    last_price,
    close_price,
    pnl,
    day_change,
    day_change_percentage,
    auction_number,
});

/// An open intraday or carried-forward position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub tradingsymbol: String,
    pub exchange: String,
    pub instrument_token: u64,
    pub product: String,
    pub quantity: i64,
    pub overnight_quantity: i64,
    pub multiplier: Decimal,
    pub average_price: Decimal,
    pub close_price: Decimal,
    pub last_price: Decimal,
    pub value: Decimal,
    pub pnl: Decimal,
    pub m2m: Decimal,
    pub unrealised: Decimal,
    pub realised: Decimal,
    pub buy_quantity: i64,
    pub buy_price: Decimal,
    pub buy_value: Decimal,
    pub buy_m2m: Decimal,
    pub sell_quantity: i64,
    pub sell_price: Decimal,
    pub sell_value: Decimal,
    pub sell_m2m: Decimal,
    pub day_buy_quantity: i64,
    pub day_buy_price: Decimal,
    pub day_buy_value: Decimal,
    pub day_sell_quantity: i64,
    pub day_sell_price: Decimal,
    pub day_sell_value: Decimal,
}

describable!(Position {
    tradingsymbol,
    exchange,
    instrument_token,
    product,
    quantity,
    overnight_quantity,
    multiplier,
    average_price,
    close_price,
    last_price,
    value,
    pnl,
    m2m,
    unrealised,
    realised,
    buy_quantity,
    buy_price,
    buy_value,
    buy_m2m,
    sell_quantity,
    sell_price,
    sell_value,
    sell_m2m,
    day_buy_quantity,
    day_buy_price,
    day_buy_value,
    day_sell_quantity,
    day_sell_price,
    day_sell_value,
});

/// Net (carried) and day (intraday) position books.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Positions {
    pub net: Vec<Position>,
    pub day: Vec<Position>,
}

// ---------------------------------------------------------------------------
// Order margins
// ---------------------------------------------------------------------------

/// One order to compute margins for. Numeric values are sent to the broker
/// exactly as the caller supplied them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMarginParam {
    pub exchange: String,
    pub tradingsymbol: String,
    pub transaction_type: String,
    pub variety: String,
    pub product: String,
    pub order_type: String,
    pub quantity: f64,
    pub price: f64,
    pub trigger_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PnL {
    pub realised: Decimal,
    pub unrealised: Decimal,
}

describable!(PnL { realised, unrealised });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gst {
    pub igst: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub total: Decimal,
}

describable!(Gst { igst, cgst, sgst, total });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Charges {
    pub transaction_tax: Decimal,
    pub transaction_tax_type: String,
    pub exchange_turnover_charge: Decimal,
    pub sebi_turnover_charge: Decimal,
    pub brokerage: Decimal,
    pub stamp_duty: Decimal,
    pub gst: Gst,
    pub total: Decimal,
}

describable!(Charges {
    transaction_tax,
    transaction_tax_type,
    exchange_turnover_charge,
    sebi_turnover_charge,
    brokerage,
    stamp_duty,
    gst,
    total,
});

/// Margin requirement for one order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderMargins {
    #[serde(rename = "type")]
    pub margin_type: String,
    pub tradingsymbol: String,
    pub exchange: String,
    pub span: Decimal,
    pub exposure: Decimal,
    pub option_premium: Decimal,
    pub additional: Decimal,
    pub bo: Decimal,
    pub cash: Decimal,
    pub var: Decimal,
    pub pnl: PnL,
    pub leverage: Decimal,
    pub charges: Charges,
    pub total: Decimal,
}

describable!(OrderMargins {
    margin_type,
    tradingsymbol,
    exchange,
    span,
    exposure,
    option_premium,
    additional,
    bo,
    cash,
    var,
    pnl,
    leverage,
    charges,
    total,
});

// ---------------------------------------------------------------------------
// Market quotes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ohlc {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

describable!(Ohlc { open, high, low, close });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthItem {
    pub price: Decimal,
    pub quantity: i64,
    pub orders: i64,
}

describable!(DepthItem { price, quantity, orders });

/// Five best bids and offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Depth {
    pub buy: Vec<DepthItem>,
    pub sell: Vec<DepthItem>,
}

describable!(Depth { buy, sell });

/// Full market quote. `instrument` is the `exchange:tradingsymbol` key the
/// quote was returned under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quote {
    pub instrument: String,
    pub instrument_token: u64,
    pub timestamp: Option<String>,
    pub last_trade_time: Option<String>,
    pub last_price: Decimal,
    pub last_quantity: i64,
    pub buy_quantity: i64,
    pub sell_quantity: i64,
    pub volume: i64,
    pub average_price: Decimal,
    pub oi: Decimal,
    pub oi_day_high: Decimal,
    pub oi_day_low: Decimal,
    pub net_change: Decimal,
    pub lower_circuit_limit: Decimal,
    pub upper_circuit_limit: Decimal,
    pub ohlc: Ohlc,
    pub depth: Depth,
}

describable!(Quote {
    instrument,
    instrument_token,
    timestamp,
    last_trade_time,
    last_price,
    last_quantity,
    buy_quantity,
    sell_quantity,
    volume,
    average_price,
    oi,
    oi_day_high,
    oi_day_low,
    net_change,
    lower_circuit_limit,
    upper_circuit_limit,
    ohlc,
    depth,
});

/// Last traded price of one instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ltp {
    pub instrument: String,
    pub instrument_token: u64,
    pub last_price: Decimal,
}

describable!(Ltp {
    instrument,
    instrument_token,
    last_price,
});

/// Last traded price with the day's OHLC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OhlcQuote {
    pub instrument: String,
    pub instrument_token: u64,
    pub last_price: Decimal,
    pub ohlc: Ohlc,
}

describable!(OhlcQuote {
    instrument,
    instrument_token,
    last_price,
    ohlc,
});

/// One candle of historical data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalCandle {
    pub date: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
    pub oi: i64,
}

describable!(HistoricalCandle {
    date,
    open,
    high,
    low,
    close,
    volume,
    oi,
});

/// Query for a historical candle series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalDataParams {
    pub instrument_token: u64,
    pub interval: String,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub continuous: bool,
    pub oi: bool,
}

// ---------------------------------------------------------------------------
// Instruments
// ---------------------------------------------------------------------------

/// A row of the exchange instrument dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub instrument_token: u64,
    pub exchange_token: u64,
    pub tradingsymbol: String,
    pub name: String,
    pub last_price: Decimal,
    pub expiry: Option<String>,
    pub strike: Decimal,
    pub tick_size: Decimal,
    pub lot_size: i64,
    pub instrument_type: String,
    pub segment: String,
    pub exchange: String,
}

describable!(Instrument {
    instrument_token,
    exchange_token,
    tradingsymbol,
    name,
    last_price,
    expiry,
    strike,
    tick_size,
    lot_size,
    instrument_type,
    segment,
    exchange,
});

/// A row of the mutual fund instrument dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MfInstrument {
    pub tradingsymbol: String,
    pub amc: String,
    pub name: String,
    #[serde(deserialize_with = "flag")]
    pub purchase_allowed: bool,
    #[serde(deserialize_with = "flag")]
    pub redemption_allowed: bool,
    pub minimum_purchase_amount: Decimal,
    pub purchase_amount_multiplier: Decimal,
    pub minimum_additional_purchase_amount: Decimal,
    pub minimum_redemption_quantity: Decimal,
    pub redemption_quantity_multiplier: Decimal,
    pub dividend_type: String,
    pub scheme_type: String,
    pub plan: String,
    pub settlement_type: String,
    pub last_price: Decimal,
    pub last_price_date: Option<String>,
}

describable!(MfInstrument {
    tradingsymbol,
    amc,
    name,
    purchase_allowed,
    redemption_allowed,
    minimum_purchase_amount,
    purchase_amount_multiplier,
    minimum_additional_purchase_amount,
    minimum_redemption_quantity,
    redemption_quantity_multiplier,
    dividend_type,
    scheme_type,
    plan,
    settlement_type,
    last_price,
    last_price_date,
});

/// Instrument dumps encode booleans as `1`/`0`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "1" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "false" | "FALSE" | "False" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid flag value: {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Mutual funds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfOrder {
    pub order_id: String,
    pub exchange_order_id: Option<String>,
    pub tradingsymbol: String,
    pub status: String,
    pub status_message: Option<String>,
    pub folio: Option<String>,
    pub fund: String,
    pub order_timestamp: Option<String>,
    pub exchange_timestamp: Option<String>,
    pub settlement_id: Option<String>,
    pub transaction_type: String,
    pub variety: String,
    pub purchase_type: String,
    pub quantity: Decimal,
    pub amount: Decimal,
    pub last_price: Decimal,
    pub average_price: Decimal,
    pub placed_by: String,
    pub tag: Option<String>,
}

describable!(MfOrder {
    order_id,
    exchange_order_id,
    tradingsymbol,
    status,
    status_message,
    folio,
    fund,
    order_timestamp,
    exchange_timestamp,
    settlement_id,
    transaction_type,
    variety,
    purchase_type,
    quantity,
    amount,
    last_price,
    average_price,
    placed_by,
    tag,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfSipInfo {
    pub sip_id: String,
    pub tradingsymbol: String,
    pub fund: String,
    pub dividend_type: String,
    pub transaction_type: String,
    pub status: String,
    pub sip_type: String,
    pub created: Option<String>,
    pub frequency: String,
    pub instalment_amount: Decimal,
    pub instalments: i64,
    pub last_instalment: Option<String>,
    pub pending_instalments: i64,
    pub instalment_day: i64,
    pub completed_instalments: i64,
    pub next_instalment: Option<String>,
    pub trigger_price: Decimal,
    pub tag: Option<String>,
}

describable!(MfSipInfo {
    sip_id,
    tradingsymbol,
    fund,
    dividend_type,
    transaction_type,
    status,
    sip_type,
    created,
    frequency,
    instalment_amount,
    instalments,
    last_instalment,
    pending_instalments,
    instalment_day,
    completed_instalments,
    next_instalment,
    trigger_price,
    tag,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfHolding {
    pub folio: String,
    pub fund: String,
    pub tradingsymbol: String,
    pub average_price: Decimal,
    pub last_price: Decimal,
    pub last_price_date: Option<String>,
    pub pnl: Decimal,
    pub quantity: Decimal,
    pub pledged_quantity: Decimal,
}

describable!(MfHolding {
    folio,
    fund,
    tradingsymbol,
    average_price,
    last_price,
    last_price_date,
    pnl,
    quantity,
    pledged_quantity,
});

/// One allotment trade behind a mutual fund holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfHoldingBreakdown {
    pub fund: String,
    pub tradingsymbol: String,
    pub average_price: Decimal,
    pub variety: String,
    pub exchange_timestamp: Option<String>,
    pub amount: Decimal,
    pub folio: String,
    pub quantity: Decimal,
}

describable!(MfHoldingBreakdown {
    fund,
    tradingsymbol,
    average_price,
    variety,
    exchange_timestamp,
    amount,
    folio,
    quantity,
});

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserMeta {
    pub demat_consent: String,
}

describable!(UserMeta { demat_consent });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub user_id: String,
    pub user_name: String,
    pub user_shortname: String,
    pub avatar_url: Option<String>,
    pub user_type: String,
    pub email: String,
    pub broker: String,
    pub meta: UserMeta,
    pub products: Vec<String>,
    pub order_types: Vec<String>,
    pub exchanges: Vec<String>,
}

describable!(UserProfile {
    user_id,
    user_name,
    user_shortname,
    avatar_url,
    user_type,
    email,
    broker,
    meta,
    products,
    order_types,
    exchanges,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableMargins {
    pub adhoc_margin: Decimal,
    pub cash: Decimal,
    pub collateral: Decimal,
    pub intraday_payin: Decimal,
    pub live_balance: Decimal,
    pub opening_balance: Decimal,
}

describable!(AvailableMargins {
    adhoc_margin,
    cash,
    collateral,
    intraday_payin,
    live_balance,
    opening_balance,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsedMargins {
    pub debits: Decimal,
    pub exposure: Decimal,
    pub m2m_realised: Decimal,
    pub m2m_unrealised: Decimal,
    pub option_premium: Decimal,
    pub payout: Decimal,
    pub span: Decimal,
    pub holding_sales: Decimal,
    pub turnover: Decimal,
    pub liquid_collateral: Decimal,
    pub stock_collateral: Decimal,
    pub delivery: Decimal,
}

describable!(UsedMargins {
    debits,
    exposure,
    m2m_realised,
    m2m_unrealised,
    option_premium,
    payout,
    span,
    holding_sales,
    turnover,
    liquid_collateral,
    stock_collateral,
    delivery,
});

/// Funds and margin usage for one segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub enabled: bool,
    pub net: Decimal,
    pub available: AvailableMargins,
    #[serde(rename = "utilised")]
    pub used: UsedMargins,
}

describable!(Margins {
    enabled,
    net,
    available,
    used,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllMargins {
    pub equity: Margins,
    pub commodity: Margins,
}

describable!(AllMargins { equity, commodity });

/// Result of exchanging a request token for an access token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSession {
    pub user_id: String,
    pub user_name: String,
    pub access_token: String,
    pub public_token: String,
    pub login_time: Option<String>,
}
