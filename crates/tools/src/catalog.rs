use crate::schema::{ParamSpec, ToolDefinition};

pub const GET_KITE_HOLDINGS: &str = "get_kite_holdings";
pub const GET_AUCTION_INSTRUMENTS: &str = "get_auction_instruments";
pub const GET_POSITIONS: &str = "get_positions";
pub const GET_ORDER_MARGINS: &str = "get_order_margins";
pub const GET_QUOTE: &str = "get_quote";
pub const GET_LTP: &str = "get_ltp";
pub const GET_OHLC: &str = "get_ohlc";
pub const GET_HISTORICAL_DATA: &str = "get_historical_data";
pub const GET_INSTRUMENTS: &str = "get_instruments";
pub const GET_INSTRUMENTS_BY_EXCHANGE: &str = "get_instruments_by_exchange";
pub const GET_MF_INSTRUMENTS: &str = "get_mf_instruments";
pub const GET_MF_ORDERS: &str = "get_mf_orders";
pub const GET_MF_ORDER_INFO: &str = "get_mf_order_info";
pub const GET_MF_SIP_INFO: &str = "get_mf_sip_info";
pub const GET_MF_HOLDINGS: &str = "get_mf_holdings";
pub const GET_MF_HOLDINGS_INFO: &str = "get_mf_holdings_info";
pub const GET_MF_ALLOTTED_ISINS: &str = "get_mf_allotted_isins";
pub const GET_USER_PROFILE: &str = "get_user_profile";
pub const GET_USER_MARGINS: &str = "get_user_margins";
pub const GET_USER_SEGMENT_MARGINS: &str = "get_user_segment_margins";

pub const EXCHANGES: &[&str] = &["nse", "bse"];

pub const INTERVALS: &[&str] = &[
    "minute", "3minute", "5minute", "10minute", "15minute", "30minute", "60minute", "day",
];

fn instrument_param() -> ParamSpec {
    ParamSpec::string("instrument", "format of `exchange:tradingsymbol`")
}

/// Every tool the server registers, in registration order.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            GET_KITE_HOLDINGS,
            "Get current holdings in Zerodha Kite account. This includes stocks, ETFs, and other \
             securities traded on NSE/BSE exchanges. Does not include mutual fund holdings.",
        ),
        ToolDefinition::new(
            GET_AUCTION_INSTRUMENTS,
            "Retrieves list of available instruments for a auction session",
        ),
        ToolDefinition::new(
            GET_POSITIONS,
            "Get current day and net positions in your Zerodha account. Day positions show \
             intraday trades, while net positions show delivery holdings and carried forward F&O \
             positions. Includes quantity, average price, PnL and more details for each position.",
        ),
        ToolDefinition::new(
            GET_ORDER_MARGINS,
            "Get order margins for a specific instrument. This tool helps you check the margin \
             requirements for placing orders on Zerodha.",
        )
        .param(ParamSpec::string("exchange", "The exchange value").one_of(EXCHANGES))
        .param(ParamSpec::string("tradingSymbol", "The trading symbol"))
        .param(ParamSpec::string("transactionType", "The transaction type"))
        .param(ParamSpec::string("variety", "Variety"))
        .param(ParamSpec::string("product", "Product"))
        .param(ParamSpec::string("orderType", "Order Type"))
        .param(ParamSpec::number("quantity", "Quantity"))
        .param(ParamSpec::number("price", "Price"))
        .param(ParamSpec::number("triggerPrice", "Trigger Price")),
        ToolDefinition::new(
            GET_QUOTE,
            "Get quote for a specific instrument. This tool provides real-time market data for \
             stocks, ETFs, and other securities traded on NSE/BSE exchanges.",
        )
        .param(instrument_param()),
        ToolDefinition::new(
            GET_LTP,
            "Get Last Traded Price (LTP) for a specific instrument. This tool provides the latest \
             price at which the instrument was traded in the market.",
        )
        .param(instrument_param()),
        ToolDefinition::new(
            GET_OHLC,
            "Get Open, High, Low, Close (OHLC) quotes for a specific instrument.",
        )
        .param(instrument_param()),
        ToolDefinition::new(
            GET_HISTORICAL_DATA,
            "Get historical candles for an instrument token over a date range. Dates use the \
             layout `YYYY-MM-DD HH:MM:SS`.",
        )
        .param(ParamSpec::number("instrumentToken", "Instrument token of the instrument"))
        .param(ParamSpec::string("interval", "Candle interval").one_of(INTERVALS))
        .param(ParamSpec::string("fromDate", "Start of the range, `YYYY-MM-DD HH:MM:SS`"))
        .param(ParamSpec::string("toDate", "End of the range, `YYYY-MM-DD HH:MM:SS`"))
        .param(ParamSpec::string("continuous", "`true` for continuous futures data"))
        .param(ParamSpec::string("oi", "`true` to include open interest")),
        ToolDefinition::new(
            GET_INSTRUMENTS,
            "Get list of all available instruments on Zerodha, including stocks, ETFs, futures, \
             options, and more.",
        ),
        ToolDefinition::new(
            GET_INSTRUMENTS_BY_EXCHANGE,
            "Get list of instruments by exchange. This tool allows you to filter and retrieve \
             specific instruments based on the exchange they are traded on.",
        )
        .param(ParamSpec::string("exchange", "The exchange value").one_of(EXCHANGES)),
        ToolDefinition::new(
            GET_MF_INSTRUMENTS,
            "Get list of all available mutual fund instruments on Zerodha.",
        ),
        ToolDefinition::new(GET_MF_ORDERS, "Get list of all Mutual Fund orders."),
        ToolDefinition::new(
            GET_MF_ORDER_INFO,
            "Get individual mutual fund order info, including the order ID, status, and other \
             relevant details.",
        )
        .param(ParamSpec::string("orderId", "The Order ID of the mutual fund")),
        ToolDefinition::new(
            GET_MF_SIP_INFO,
            "Get individual mutual fund SIP info, including the SIP ID, status, and other \
             relevant details.",
        )
        .param(ParamSpec::string("sipId", "The SIP ID of the mutual fund")),
        ToolDefinition::new(GET_MF_HOLDINGS, "Get list of Mutual fund holdings for a user."),
        ToolDefinition::new(
            GET_MF_HOLDINGS_INFO,
            "Get individual mutual fund holdings info for one ISIN.",
        )
        .param(ParamSpec::string("isin", "The ISIN of the mutual fund holding")),
        ToolDefinition::new(GET_MF_ALLOTTED_ISINS, "Get Allotted mutual fund ISINs."),
        ToolDefinition::new(
            GET_USER_PROFILE,
            "Get basic user profile. This tool provides basic information about the user, \
             including the user ID, name, and other relevant details.",
        ),
        ToolDefinition::new(GET_USER_MARGINS, "Get all user margins."),
        ToolDefinition::new(GET_USER_SEGMENT_MARGINS, "Get segment wise user margins.")
            .param(ParamSpec::string("segment", "Margin segment, `equity` or `commodity`")),
    ]
}
