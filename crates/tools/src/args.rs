use crate::error::ToolError;
use chrono::NaiveDateTime;
use kitemcp_core::{HistoricalDataParams, OrderMarginParam};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// Layout of date arguments.
pub const DATE_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Decode validated arguments into a typed record.
pub fn decode<T: DeserializeOwned>(args: &Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|e| ToolError::InvalidArgument(e.to_string()))
}

pub fn parse_date(name: &str, value: &str) -> Result<NaiveDateTime, ToolError> {
    NaiveDateTime::parse_from_str(value, DATE_LAYOUT).map_err(|e| {
        ToolError::InvalidArgument(format!(
            "parameter `{name}` must match YYYY-MM-DD HH:MM:SS, got {value:?}: {e}"
        ))
    })
}

/// Boolean-valued strings: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_flag(name: &str, value: &str) -> Result<bool, ToolError> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ToolError::InvalidArgument(format!(
            "parameter `{name}` must be a boolean string, got {value:?}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
pub struct InstrumentArgs {
    pub instrument: String,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeArgs {
    pub exchange: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIdArgs {
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipIdArgs {
    pub sip_id: String,
}

#[derive(Debug, Deserialize)]
pub struct IsinArgs {
    pub isin: String,
}

#[derive(Debug, Deserialize)]
pub struct SegmentArgs {
    pub segment: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMarginArgs {
    pub exchange: String,
    pub trading_symbol: String,
    pub transaction_type: String,
    pub variety: String,
    pub product: String,
    pub order_type: String,
    pub quantity: f64,
    pub price: f64,
    pub trigger_price: f64,
}

impl From<OrderMarginArgs> for OrderMarginParam {
    fn from(args: OrderMarginArgs) -> Self {
        Self {
            exchange: args.exchange,
            tradingsymbol: args.trading_symbol,
            transaction_type: args.transaction_type,
            variety: args.variety,
            product: args.product,
            order_type: args.order_type,
            quantity: args.quantity,
            price: args.price,
            trigger_price: args.trigger_price,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalArgs {
    pub instrument_token: Number,
    pub interval: String,
    pub from_date: String,
    pub to_date: String,
    pub continuous: String,
    pub oi: String,
}

impl HistoricalArgs {
    pub fn into_params(self) -> Result<HistoricalDataParams, ToolError> {
        Ok(HistoricalDataParams {
            instrument_token: instrument_token(&self.instrument_token)?,
            from: parse_date("fromDate", &self.from_date)?,
            to: parse_date("toDate", &self.to_date)?,
            continuous: parse_flag("continuous", &self.continuous)?,
            oi: parse_flag("oi", &self.oi)?,
            interval: self.interval,
        })
    }
}

fn instrument_token(n: &Number) -> Result<u64, ToolError> {
    n.as_u64()
        .or_else(|| {
            n.as_f64()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v < u64::MAX as f64)
                .map(|v| v as u64)
        })
        .ok_or_else(|| {
            ToolError::InvalidArgument(format!(
                "parameter `instrumentToken` must be a non-negative integer, got {n}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_flag_accepts_go_style_literals() {
        assert!(parse_flag("oi", "true").unwrap());
        assert!(parse_flag("oi", "T").unwrap());
        assert!(!parse_flag("oi", "0").unwrap());
        assert!(matches!(
            parse_flag("oi", "yes"),
            Err(ToolError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_date_layout() {
        let parsed = parse_date("fromDate", "2024-03-01 09:15:00").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        assert_eq!(parsed, expected);
        assert!(parse_date("fromDate", "2024-03-01").is_err());
    }

    #[test]
    fn test_historical_args_into_params() {
        let args: HistoricalArgs = decode(&map(json!({
            "instrumentToken": 408065,
            "interval": "day",
            "fromDate": "2024-01-01 00:00:00",
            "toDate": "2024-01-31 00:00:00",
            "continuous": "false",
            "oi": "1"
        })))
        .unwrap();
        let params = args.into_params().unwrap();
        assert_eq!(params.instrument_token, 408065);
        assert_eq!(params.interval, "day");
        assert!(!params.continuous);
        assert!(params.oi);
    }

    #[test]
    fn test_fractional_instrument_token_is_rejected() {
        assert!(instrument_token(&Number::from_f64(12.5).unwrap()).is_err());
        assert_eq!(instrument_token(&Number::from_f64(12.0).unwrap()).unwrap(), 12);
    }

    #[test]
    fn test_order_margin_args_map_camel_case() {
        let args: OrderMarginArgs = decode(&map(json!({
            "exchange": "nse",
            "tradingSymbol": "INFY",
            "transactionType": "BUY",
            "variety": "regular",
            "product": "CNC",
            "orderType": "LIMIT",
            "quantity": 10,
            "price": 1500.5,
            "triggerPrice": 0
        })))
        .unwrap();
        let param = OrderMarginParam::from(args);
        assert_eq!(param.tradingsymbol, "INFY");
        assert_eq!(param.quantity, 10.0);
        assert_eq!(param.price, 1500.5);
    }
}
