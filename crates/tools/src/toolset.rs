use crate::args::{self, *};
use crate::catalog::{self, *};
use crate::error::ToolError;
use crate::schema::ToolDefinition;
use kitemcp_core::{
    describe, describe_all, holdings_text, positions_text, BrokerClient, Render,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// The registered tools bound to a live broker client.
pub struct ToolSet {
    broker: Arc<dyn BrokerClient>,
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    pub fn new(broker: Arc<dyn BrokerClient>) -> Self {
        Self {
            broker,
            definitions: catalog::definitions(),
        }
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Run one tool invocation.
    ///
    /// Arguments are validated against the tool's schema before anything else,
    /// so a rejected invocation never reaches the broker.
    pub async fn invoke(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError> {
        let definition = self
            .definition(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        definition.validate(args)?;

        debug!(tool = name, "Invoking tool");
        let broker = self.broker.as_ref();

        let text = match name {
            GET_KITE_HOLDINGS => holdings_text(&broker.holdings().await?),
            GET_AUCTION_INSTRUMENTS => describe_all(&broker.auction_instruments().await?),
            GET_POSITIONS => positions_text(&broker.positions().await?),
            GET_ORDER_MARGINS => {
                let order: OrderMarginArgs = args::decode(args)?;
                describe_all(&broker.order_margins(vec![order.into()]).await?)
            }
            GET_QUOTE => {
                let InstrumentArgs { instrument } = args::decode(args)?;
                describe_all(&broker.quote(&[instrument]).await?)
            }
            GET_LTP => {
                let InstrumentArgs { instrument } = args::decode(args)?;
                describe_all(&broker.ltp(&[instrument]).await?)
            }
            GET_OHLC => {
                let InstrumentArgs { instrument } = args::decode(args)?;
                describe_all(&broker.ohlc(&[instrument]).await?)
            }
            GET_HISTORICAL_DATA => {
                let params = args::decode::<HistoricalArgs>(args)?.into_params()?;
                describe_all(&broker.historical_data(params).await?)
            }
            GET_INSTRUMENTS => describe_all(&broker.instruments().await?),
            GET_INSTRUMENTS_BY_EXCHANGE => {
                let ExchangeArgs { exchange } = args::decode(args)?;
                describe_all(&broker.instruments_by_exchange(&exchange).await?)
            }
            GET_MF_INSTRUMENTS => describe_all(&broker.mf_instruments().await?),
            GET_MF_ORDERS => describe_all(&broker.mf_orders().await?),
            GET_MF_ORDER_INFO => {
                let OrderIdArgs { order_id } = args::decode(args)?;
                describe(&broker.mf_order_info(&order_id).await?)
            }
            GET_MF_SIP_INFO => {
                let SipIdArgs { sip_id } = args::decode(args)?;
                describe(&broker.mf_sip_info(&sip_id).await?)
            }
            GET_MF_HOLDINGS => describe_all(&broker.mf_holdings().await?),
            GET_MF_HOLDINGS_INFO => {
                let IsinArgs { isin } = args::decode(args)?;
                describe_all(&broker.mf_holding_info(&isin).await?)
            }
            GET_MF_ALLOTTED_ISINS => broker.mf_allotted_isins().await?.render(),
            GET_USER_PROFILE => describe(&broker.user_profile().await?),
            GET_USER_MARGINS => describe(&broker.user_margins().await?),
            GET_USER_SEGMENT_MARGINS => {
                let SegmentArgs { segment } = args::decode(args)?;
                describe(&broker.user_segment_margins(&segment).await?)
            }
            _ => return Err(ToolError::UnknownTool(name.to_string())),
        };

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kitemcp_core::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every call with its arguments and answers with fixtures.
    #[derive(Default)]
    struct RecordingBroker {
        calls: Mutex<Vec<String>>,
        fail_with: Option<(String, String)>,
    }

    impl RecordingBroker {
        fn record(&self, call: String) -> Result<(), BrokerError> {
            self.calls.lock().unwrap().push(call);
            match &self.fail_with {
                Some((error_type, message)) => Err(BrokerError::Api {
                    error_type: error_type.clone(),
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BrokerClient for RecordingBroker {
        async fn holdings(&self) -> Result<Vec<Holding>, BrokerError> {
            self.record("holdings".into())?;
            Ok(vec![
                Holding {
                    tradingsymbol: "INFY".into(),
                    quantity: 2,
                    average_price: dec!(1400),
                    last_price: dec!(1500),
                    ..Default::default()
                },
                Holding {
                    tradingsymbol: "TCS".into(),
                    quantity: 1,
                    ..Default::default()
                },
            ])
        }

        async fn auction_instruments(&self) -> Result<Vec<AuctionInstrument>, BrokerError> {
            self.record("auction_instruments".into())?;
            Ok(vec![])
        }

        async fn positions(&self) -> Result<Positions, BrokerError> {
            self.record("positions".into())?;
            Ok(Positions::default())
        }

        async fn order_margins(
            &self,
            orders: Vec<OrderMarginParam>,
        ) -> Result<Vec<OrderMargins>, BrokerError> {
            self.record(format!("order_margins {:?}", orders))?;
            Ok(vec![OrderMargins {
                tradingsymbol: orders[0].tradingsymbol.clone(),
                total: dec!(150.25),
                ..Default::default()
            }])
        }

        async fn quote(&self, instruments: &[String]) -> Result<Vec<Quote>, BrokerError> {
            self.record(format!("quote {:?}", instruments))?;
            Ok(vec![])
        }

        async fn ltp(&self, instruments: &[String]) -> Result<Vec<Ltp>, BrokerError> {
            self.record(format!("ltp {:?}", instruments))?;
            Ok(instruments
                .iter()
                .map(|i| Ltp {
                    instrument: i.clone(),
                    instrument_token: 408065,
                    last_price: dec!(1500.5),
                })
                .collect())
        }

        async fn ohlc(&self, instruments: &[String]) -> Result<Vec<OhlcQuote>, BrokerError> {
            self.record(format!("ohlc {:?}", instruments))?;
            Ok(vec![])
        }

        async fn historical_data(
            &self,
            params: HistoricalDataParams,
        ) -> Result<Vec<HistoricalCandle>, BrokerError> {
            self.record(format!(
                "historical_data {} {} {} {} {} {}",
                params.instrument_token,
                params.interval,
                params.from,
                params.to,
                params.continuous,
                params.oi
            ))?;
            Ok(vec![])
        }

        async fn instruments(&self) -> Result<Vec<Instrument>, BrokerError> {
            self.record("instruments".into())?;
            Ok(vec![])
        }

        async fn instruments_by_exchange(
            &self,
            exchange: &str,
        ) -> Result<Vec<Instrument>, BrokerError> {
            self.record(format!("instruments_by_exchange {exchange}"))?;
            Ok(vec![])
        }

        async fn mf_instruments(&self) -> Result<Vec<MfInstrument>, BrokerError> {
            self.record("mf_instruments".into())?;
            Ok(vec![])
        }

        async fn mf_orders(&self) -> Result<Vec<MfOrder>, BrokerError> {
            self.record("mf_orders".into())?;
            Ok(vec![])
        }

        async fn mf_order_info(&self, order_id: &str) -> Result<MfOrder, BrokerError> {
            self.record(format!("mf_order_info {order_id}"))?;
            Ok(MfOrder::default())
        }

        async fn mf_sip_info(&self, sip_id: &str) -> Result<MfSipInfo, BrokerError> {
            self.record(format!("mf_sip_info {sip_id}"))?;
            Ok(MfSipInfo::default())
        }

        async fn mf_holdings(&self) -> Result<Vec<MfHolding>, BrokerError> {
            self.record("mf_holdings".into())?;
            Ok(vec![])
        }

        async fn mf_holding_info(
            &self,
            isin: &str,
        ) -> Result<Vec<MfHoldingBreakdown>, BrokerError> {
            self.record(format!("mf_holding_info {isin}"))?;
            Ok(vec![])
        }

        async fn mf_allotted_isins(&self) -> Result<Vec<String>, BrokerError> {
            self.record("mf_allotted_isins".into())?;
            Ok(vec!["INF209K01157".into(), "INF846K01EW2".into()])
        }

        async fn user_profile(&self) -> Result<UserProfile, BrokerError> {
            self.record("user_profile".into())?;
            Ok(UserProfile::default())
        }

        async fn user_margins(&self) -> Result<AllMargins, BrokerError> {
            self.record("user_margins".into())?;
            Ok(AllMargins::default())
        }

        async fn user_segment_margins(&self, segment: &str) -> Result<Margins, BrokerError> {
            self.record(format!("user_segment_margins {segment}"))?;
            Ok(Margins::default())
        }
    }

    fn tool_set() -> (Arc<RecordingBroker>, ToolSet) {
        let broker = Arc::new(RecordingBroker::default());
        let tools = ToolSet::new(broker.clone());
        (broker, tools)
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    /// A well-formed argument set for every tool that declares parameters.
    fn valid_args(name: &str) -> Map<String, Value> {
        match name {
            GET_ORDER_MARGINS => args(json!({
                "exchange": "nse",
                "tradingSymbol": "INFY",
                "transactionType": "BUY",
                "variety": "regular",
                "product": "CNC",
                "orderType": "LIMIT",
                "quantity": 10,
                "price": 1500.5,
                "triggerPrice": 0
            })),
            GET_QUOTE | GET_LTP | GET_OHLC => args(json!({ "instrument": "NSE:INFY" })),
            GET_HISTORICAL_DATA => args(json!({
                "instrumentToken": 408065,
                "interval": "day",
                "fromDate": "2024-01-01 09:15:00",
                "toDate": "2024-01-31 15:30:00",
                "continuous": "false",
                "oi": "true"
            })),
            GET_INSTRUMENTS_BY_EXCHANGE => args(json!({ "exchange": "bse" })),
            GET_MF_ORDER_INFO => args(json!({ "orderId": "ord-1" })),
            GET_MF_SIP_INFO => args(json!({ "sipId": "sip-1" })),
            GET_MF_HOLDINGS_INFO => args(json!({ "isin": "INF209K01157" })),
            GET_USER_SEGMENT_MARGINS => args(json!({ "segment": "equity" })),
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_required_param_never_calls_broker() {
        let (broker, tools) = tool_set();

        for definition in tools.definitions() {
            for param in definition.params.iter().filter(|p| p.required) {
                let mut partial = valid_args(definition.name);
                partial.remove(param.name);

                let err = tools.invoke(definition.name, &partial).await.unwrap_err();
                assert!(
                    matches!(err, ToolError::InvalidArgument(_)),
                    "{} without {} gave {err:?}",
                    definition.name,
                    param.name
                );
            }
        }

        assert!(broker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_valid_args_call_broker_exactly_once() {
        for definition in catalog::definitions() {
            let (broker, tools) = tool_set();
            tools
                .invoke(definition.name, &valid_args(definition.name))
                .await
                .unwrap();
            assert_eq!(broker.calls().len(), 1, "{}", definition.name);
        }
    }

    #[tokio::test]
    async fn test_args_pass_through_unchanged() {
        let (broker, tools) = tool_set();

        tools.invoke(GET_LTP, &valid_args(GET_LTP)).await.unwrap();
        tools
            .invoke(GET_INSTRUMENTS_BY_EXCHANGE, &valid_args(GET_INSTRUMENTS_BY_EXCHANGE))
            .await
            .unwrap();
        tools
            .invoke(GET_MF_ORDER_INFO, &valid_args(GET_MF_ORDER_INFO))
            .await
            .unwrap();
        tools
            .invoke(GET_HISTORICAL_DATA, &valid_args(GET_HISTORICAL_DATA))
            .await
            .unwrap();

        assert_eq!(
            broker.calls(),
            vec![
                "ltp [\"NSE:INFY\"]".to_string(),
                "instruments_by_exchange bse".to_string(),
                "mf_order_info ord-1".to_string(),
                "historical_data 408065 day 2024-01-01 09:15:00 2024-01-31 15:30:00 false true"
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_order_margin_numbers_pass_through() {
        let (broker, tools) = tool_set();
        let text = tools
            .invoke(GET_ORDER_MARGINS, &valid_args(GET_ORDER_MARGINS))
            .await
            .unwrap();

        let call = &broker.calls()[0];
        assert!(call.contains("exchange: \"nse\""));
        assert!(call.contains("quantity: 10.0"));
        assert!(call.contains("price: 1500.5"));
        assert!(text.contains("tradingsymbol: INFY"));
        assert!(text.contains("total: 150.25"));
    }

    #[tokio::test]
    async fn test_unparseable_date_is_invalid_argument() {
        let (broker, tools) = tool_set();
        let mut bad = valid_args(GET_HISTORICAL_DATA);
        bad.insert("fromDate".into(), json!("01/01/2024"));

        let err = tools.invoke(GET_HISTORICAL_DATA, &bad).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));
        assert!(broker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_flag_is_invalid_argument() {
        let (broker, tools) = tool_set();
        let mut bad = valid_args(GET_HISTORICAL_DATA);
        bad.insert("oi".into(), json!("maybe"));

        let err = tools.invoke(GET_HISTORICAL_DATA, &bad).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));
        assert!(broker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type_is_invalid_argument() {
        let (broker, tools) = tool_set();
        let err = tools
            .invoke(GET_LTP, &args(json!({ "instrument": 408065 })))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));
        assert!(broker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_holdings_emit_one_line_per_record() {
        let (_, tools) = tool_set();
        let text = tools.invoke(GET_KITE_HOLDINGS, &Map::new()).await.unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));
        assert!(lines[0].starts_with("Holding: Tradingsymbol: INFY, "));
        assert!(lines[0].contains("BuyValue: 2800.00, CurrentValue: 3000.00"));
    }

    #[tokio::test]
    async fn test_ltp_uses_generic_formatter() {
        let (_, tools) = tool_set();
        let text = tools.invoke(GET_LTP, &valid_args(GET_LTP)).await.unwrap();
        assert_eq!(
            text,
            "<start> instrument: NSE:INFY, instrument_token: 408065, last_price: 1500.5,  <end>\n"
        );
    }

    #[tokio::test]
    async fn test_allotted_isins_render_as_list() {
        let (_, tools) = tool_set();
        let text = tools.invoke(GET_MF_ALLOTTED_ISINS, &Map::new()).await.unwrap();
        assert_eq!(text, "[INF209K01157 INF846K01EW2]");
    }

    #[tokio::test]
    async fn test_empty_positions_keep_section_headers() {
        let (_, tools) = tool_set();
        let text = tools.invoke(GET_POSITIONS, &Map::new()).await.unwrap();
        assert_eq!(text, "DAY POSITIONS ---  \n \n NET POSITIONS --- ");
    }

    #[tokio::test]
    async fn test_broker_error_surfaces_unchanged() {
        let broker = Arc::new(RecordingBroker {
            fail_with: Some(("TokenException".into(), "Token expired".into())),
            ..Default::default()
        });
        let tools = ToolSet::new(broker);

        let err = tools.invoke(GET_USER_PROFILE, &Map::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "TokenException: Token expired");
        assert!(matches!(err, ToolError::Broker(BrokerError::Api { .. })));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (broker, tools) = tool_set();
        let err = tools.invoke("place_order", &Map::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "place_order"));
        assert!(broker.calls().is_empty());
    }
}
