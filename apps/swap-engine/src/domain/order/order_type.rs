//! Order type (market or limit).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::OrderSide;

/// Order type specifying execution behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market order - execute at best available price.
    #[default]
    Market,
    /// Limit order - execute at specified price or better.
    Limit,
}

impl OrderType {
    /// Venue order type code for this type on the given side.
    ///
    /// MARKET = 0, BUY_LIMIT = 2, SELL_LIMIT = 3.
    #[must_use]
    pub const fn wire_type(&self, side: OrderSide) -> u8 {
        match (self, side) {
            (Self::Market, _) => 0,
            (Self::Limit, OrderSide::Buy) => 2,
            (Self::Limit, OrderSide::Sell) => 3,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
        }
    }
}
