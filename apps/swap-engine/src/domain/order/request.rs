//! One leg of a swap, as submitted to the venue.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::wire::{ENGINE_MAGIC, ENGINE_TAG, FILLING_FOK, TIME_GTC, WireRequest};
use super::{OrderSide, OrderType};
use crate::domain::shared::OrderId;

/// Default per-attempt venue timeout.
pub const DEFAULT_ORDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum slippage (percent).
pub const DEFAULT_MAX_SLIPPAGE: Decimal = dec!(0.05);

/// Immutable description of one order leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    order_id: OrderId,
    symbol: String,
    side: OrderSide,
    quantity: Decimal,
    order_type: OrderType,
    price: Option<Decimal>,
    stop_loss: Option<Decimal>,
    take_profit: Option<Decimal>,
    max_slippage: Decimal,
    timeout: Duration,
}

impl OrderRequest {
    /// Create a market order request.
    #[must_use]
    pub fn market(
        order_id: OrderId,
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
    ) -> Self {
        Self {
            order_id,
            symbol: symbol.into(),
            side,
            quantity,
            order_type: OrderType::Market,
            price: None,
            stop_loss: None,
            take_profit: None,
            max_slippage: DEFAULT_MAX_SLIPPAGE,
            timeout: DEFAULT_ORDER_TIMEOUT,
        }
    }

    /// Create a limit order request.
    #[must_use]
    pub fn limit(
        order_id: OrderId,
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::Limit,
            price: Some(price),
            ..Self::market(order_id, symbol, side, quantity)
        }
    }

    /// Attach a stop loss.
    #[must_use]
    pub const fn with_stop_loss(mut self, stop_loss: Decimal) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    /// Attach a take profit.
    #[must_use]
    pub const fn with_take_profit(mut self, take_profit: Decimal) -> Self {
        self.take_profit = Some(take_profit);
        self
    }

    /// Set the maximum tolerated slippage.
    #[must_use]
    pub const fn with_max_slippage(mut self, max_slippage: Decimal) -> Self {
        self.max_slippage = max_slippage;
        self
    }

    /// Set the per-attempt venue timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Order ID.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Venue symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Buy or sell.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Requested quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Market or limit.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Limit price, if any.
    #[must_use]
    pub const fn price(&self) -> Option<Decimal> {
        self.price
    }

    /// Stop loss, if any.
    #[must_use]
    pub const fn stop_loss(&self) -> Option<Decimal> {
        self.stop_loss
    }

    /// Take profit, if any.
    #[must_use]
    pub const fn take_profit(&self) -> Option<Decimal> {
        self.take_profit
    }

    /// Maximum tolerated slippage.
    #[must_use]
    pub const fn max_slippage(&self) -> Decimal {
        self.max_slippage
    }

    /// Per-attempt venue timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Render this order in the venue wire format.
    ///
    /// A limit order without a price degrades to a market order.
    #[must_use]
    pub fn to_wire_request(&self) -> WireRequest {
        let limit_price = match self.order_type {
            OrderType::Limit => self.price,
            OrderType::Market => None,
        };
        let order_type = if limit_price.is_some() {
            self.order_type.wire_type(self.side)
        } else {
            OrderType::Market.wire_type(self.side)
        };

        WireRequest {
            action: self.side.wire_action(),
            symbol: self.symbol.clone(),
            volume: self.quantity.to_f64().unwrap_or_default(),
            order_type,
            price: limit_price.and_then(|p| p.to_f64()),
            sl: self.stop_loss.and_then(|p| p.to_f64()),
            tp: self.take_profit.and_then(|p| p.to_f64()),
            magic: ENGINE_MAGIC,
            comment: format!("{ENGINE_TAG}-{}-{}", self.side, self.order_suffix()),
            type_time: TIME_GTC,
            type_filling: FILLING_FOK,
        }
    }

    /// Last eight characters of the order ID.
    fn order_suffix(&self) -> String {
        let chars: Vec<char> = self.order_id.as_str().chars().collect();
        let start = chars.len().saturating_sub(8);
        chars[start..].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(side: OrderSide, quantity: i64) -> OrderRequest {
        OrderRequest::market(
            OrderId::new("test_order_1"),
            "ITSA3",
            side,
            Decimal::new(quantity, 0),
        )
    }

    #[test]
    fn market_request_defaults() {
        let order = market(OrderSide::Buy, 1000);

        assert_eq!(order.order_type(), OrderType::Market);
        assert_eq!(order.timeout(), Duration::from_secs(30));
        assert_eq!(order.max_slippage(), dec!(0.05));
        assert!(order.price().is_none());
    }

    #[test]
    fn wire_market_buy() {
        let wire = market(OrderSide::Buy, 500).to_wire_request();

        assert_eq!(wire.action, 1);
        assert_eq!(wire.symbol, "ITSA3");
        assert!((wire.volume - 500.0).abs() < f64::EPSILON);
        assert_eq!(wire.order_type, 0);
        assert_eq!(wire.magic, ENGINE_MAGIC);
        assert_eq!(wire.comment, "swx-BUY-_order_1");
        assert!(wire.price.is_none());
        assert!(wire.sl.is_none());
    }

    #[test]
    fn wire_market_sell() {
        let wire = market(OrderSide::Sell, 750).to_wire_request();

        assert_eq!(wire.action, 0);
        assert!((wire.volume - 750.0).abs() < f64::EPSILON);
        assert_eq!(wire.order_type, 0);
        assert!(wire.comment.starts_with("swx-SELL-"));
    }

    #[test]
    fn wire_limit_order_carries_price_and_brackets() {
        let order = OrderRequest::limit(
            OrderId::new("test_limit"),
            "ITSA3",
            OrderSide::Buy,
            Decimal::new(1000, 0),
            dec!(10.50),
        )
        .with_stop_loss(dec!(9.50))
        .with_take_profit(dec!(11.00));

        let wire = order.to_wire_request();

        assert_eq!(wire.action, 1);
        assert_eq!(wire.order_type, 2);
        assert_eq!(wire.price, Some(10.5));
        assert_eq!(wire.sl, Some(9.5));
        assert_eq!(wire.tp, Some(11.0));
    }

    #[test]
    fn wire_sell_limit_type() {
        let order = OrderRequest::limit(
            OrderId::new("test_limit"),
            "ITSA4",
            OrderSide::Sell,
            Decimal::new(10, 0),
            dec!(9.99),
        );
        assert_eq!(order.to_wire_request().order_type, 3);
    }

    #[test]
    fn wire_serializes_type_field_and_omits_absent_prices() {
        let wire = market(OrderSide::Sell, 1).to_wire_request();
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["type"], 0);
        assert_eq!(json["magic"], 20_250_829);
        assert!(json.get("price").is_none());
        assert!(json.get("sl").is_none());
        assert!(json.get("tp").is_none());
    }

    #[test]
    fn to_wire_request_is_pure() {
        let order = market(OrderSide::Buy, 42);
        assert_eq!(order.to_wire_request(), order.to_wire_request());
    }
}
