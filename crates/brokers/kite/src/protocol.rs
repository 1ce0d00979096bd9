use kitemcp_core::{BrokerError, HistoricalCandle, Ltp, OhlcQuote, Quote};
use reqwest::Url;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Value of the `X-Kite-Version` header.
pub const KITE_VERSION: &str = "3";

/// Layout of `from`/`to` in historical data queries.
pub const HISTORICAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Standard response wrapper: `{"status": "success", "data": ...}` or
/// `{"status": "error", "message": ..., "error_type": ...}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error_type: Option<String>,
}

/// `data` payload of the historical candles endpoint.
#[derive(Debug, Deserialize)]
pub struct CandlesPayload {
    pub candles: Vec<Vec<Value>>,
}

/// Decode a JSON envelope, turning error envelopes and non-JSON bodies into
/// [`BrokerError::Api`].
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, BrokerError> {
    let envelope: Envelope<T> = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) if (200..300).contains(&status) => {
            return Err(BrokerError::Decode(e.to_string()));
        }
        Err(_) => {
            return Err(BrokerError::Api {
                error_type: format!("HTTP {status}"),
                message: String::from_utf8_lossy(body).trim().to_string(),
            });
        }
    };

    if envelope.status != "success" {
        return Err(BrokerError::Api {
            error_type: envelope
                .error_type
                .unwrap_or_else(|| "GeneralException".to_string()),
            message: envelope
                .message
                .unwrap_or_else(|| format!("request failed with HTTP {status}")),
        });
    }

    envelope
        .data
        .ok_or_else(|| BrokerError::Decode("success envelope without data".to_string()))
}

/// Error for a non-2xx response whose body is not the expected payload.
pub fn decode_error(status: u16, body: &[u8]) -> BrokerError {
    match decode_envelope::<Value>(status, body) {
        Err(e) => e,
        Ok(_) => BrokerError::Api {
            error_type: format!("HTTP {status}"),
            message: "unexpected success envelope".to_string(),
        },
    }
}

/// Decode a CSV instrument dump.
pub fn decode_csv<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, BrokerError> {
    let mut reader = csv::Reader::from_reader(body);
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| BrokerError::Decode(format!("CSV error: {}", e)))
}

/// `hex(sha256(api_key + request_token + api_secret))`, sent with the token exchange.
pub fn checksum(api_key: &str, request_token: &str, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(request_token.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Login page URL for an API key.
pub fn login_url(login_base: &str, api_key: &str) -> Result<String, BrokerError> {
    let url = Url::parse_with_params(login_base, &[("v", KITE_VERSION), ("api_key", api_key)])
        .map_err(|e| BrokerError::Configuration(format!("invalid login url: {}", e)))?;
    Ok(url.to_string())
}

/// Quote-family records carry the `exchange:tradingsymbol` key they were
/// returned under.
pub trait Keyed {
    fn set_instrument(&mut self, instrument: String);
}

impl Keyed for Quote {
    fn set_instrument(&mut self, instrument: String) {
        self.instrument = instrument;
    }
}

impl Keyed for Ltp {
    fn set_instrument(&mut self, instrument: String) {
        self.instrument = instrument;
    }
}

impl Keyed for OhlcQuote {
    fn set_instrument(&mut self, instrument: String) {
        self.instrument = instrument;
    }
}

/// Flatten an instrument-keyed map into records, in key order.
pub fn keyed_records<T: Keyed>(map: BTreeMap<String, T>) -> Vec<T> {
    map.into_iter()
        .map(|(instrument, mut record)| {
            record.set_instrument(instrument);
            record
        })
        .collect()
}

/// Candles arrive as `[timestamp, open, high, low, close, volume, oi?]`.
pub fn parse_candles(rows: Vec<Vec<Value>>) -> Result<Vec<HistoricalCandle>, BrokerError> {
    rows.into_iter().map(parse_candle).collect()
}

fn parse_candle(row: Vec<Value>) -> Result<HistoricalCandle, BrokerError> {
    if row.len() < 6 {
        return Err(BrokerError::Decode(format!(
            "candle has {} fields, expected at least 6",
            row.len()
        )));
    }

    let date = row[0]
        .as_str()
        .ok_or_else(|| BrokerError::Decode("candle timestamp is not a string".to_string()))?
        .to_string();

    Ok(HistoricalCandle {
        date,
        open: decimal_at(&row, 1)?,
        high: decimal_at(&row, 2)?,
        low: decimal_at(&row, 3)?,
        close: decimal_at(&row, 4)?,
        volume: integer_at(&row, 5)?,
        oi: if row.len() > 6 { integer_at(&row, 6)? } else { 0 },
    })
}

fn decimal_at(row: &[Value], idx: usize) -> Result<Decimal, BrokerError> {
    serde_json::from_value(row[idx].clone())
        .map_err(|e| BrokerError::Decode(format!("candle field {}: {}", idx, e)))
}

fn integer_at(row: &[Value], idx: usize) -> Result<i64, BrokerError> {
    row[idx]
        .as_i64()
        .or_else(|| row[idx].as_f64().map(|v| v as i64))
        .ok_or_else(|| BrokerError::Decode(format!("candle field {} is not a number", idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitemcp_core::Instrument;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_success_envelope() {
        let body = br#"{"status":"success","data":["INE009A01021","INF209K01157"]}"#;
        let isins: Vec<String> = decode_envelope(200, body).unwrap();
        assert_eq!(isins, vec!["INE009A01021", "INF209K01157"]);
    }

    #[test]
    fn test_decode_error_envelope() {
        let body = br#"{"status":"error","message":"Incorrect `api_key` or `access_token`.","error_type":"TokenException"}"#;
        let err = decode_envelope::<Vec<String>>(403, body).unwrap_err();
        match err {
            BrokerError::Api { error_type, message } => {
                assert_eq!(error_type, "TokenException");
                assert!(message.contains("access_token"));
            }
            other => panic!("Expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_json_error_body() {
        let err = decode_envelope::<Vec<String>>(502, b"Bad Gateway").unwrap_err();
        assert!(matches!(err, BrokerError::Api { ref error_type, .. } if error_type == "HTTP 502"));
    }

    #[test]
    fn test_checksum_is_sha256_hex() {
        let sum = checksum("key", "token", "secret");
        assert_eq!(sum.len(), 64);
        assert!(sum.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(sum, checksum("key", "token", "other"));
    }

    #[test]
    fn test_login_url_carries_key_and_version() {
        let url = login_url("https://kite.zerodha.com/connect/login", "abc").unwrap();
        assert_eq!(url, "https://kite.zerodha.com/connect/login?v=3&api_key=abc");
    }

    #[test]
    fn test_keyed_records_sets_instrument() {
        let mut map = BTreeMap::new();
        map.insert(
            "NSE:INFY".to_string(),
            Ltp {
                instrument_token: 408065,
                last_price: dec!(1500),
                ..Default::default()
            },
        );
        let records = keyed_records(map);
        assert_eq!(records[0].instrument, "NSE:INFY");
        assert_eq!(records[0].instrument_token, 408065);
    }

    #[test]
    fn test_parse_candles_with_and_without_oi() {
        let rows: Vec<Vec<Value>> = serde_json::from_str(
            r#"[["2024-01-01T09:15:00+0530",1500,1510.5,1495,1505.25,12000],
                ["2024-01-01T09:16:00+0530",1505.25,1506,1501,1502,8000,350]]"#,
        )
        .unwrap();
        let candles = parse_candles(rows).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].high, dec!(1510.5));
        assert_eq!(candles[0].oi, 0);
        assert_eq!(candles[1].oi, 350);
    }

    #[test]
    fn test_parse_candle_rejects_short_rows() {
        let rows = vec![vec![Value::from("2024-01-01"), Value::from(1)]];
        assert!(matches!(parse_candles(rows), Err(BrokerError::Decode(_))));
    }

    #[test]
    fn test_decode_instrument_csv() {
        let body = b"instrument_token,exchange_token,tradingsymbol,name,last_price,expiry,strike,tick_size,lot_size,instrument_type,segment,exchange\n\
408065,1594,INFY,INFOSYS,0,,0,0.05,1,EQ,NSE,NSE\n";
        let rows: Vec<Instrument> = decode_csv(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tradingsymbol, "INFY");
        assert_eq!(rows[0].expiry, None);
        assert_eq!(rows[0].tick_size, dec!(0.05));
    }
}
