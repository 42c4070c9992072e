//! Venue wire format for order submission.

use serde::{Deserialize, Serialize};

/// Magic number attached to every order sent by this engine.
///
/// Lets fills be attributed back to the engine out-of-band.
pub const ENGINE_MAGIC: u32 = 20_250_829;

/// Comment prefix identifying the engine.
pub const ENGINE_TAG: &str = "swx";

/// Good-till-cancel expiration code.
pub const TIME_GTC: u8 = 0;

/// Fill-or-kill filling code.
pub const FILLING_FOK: u8 = 0;

/// An order as the venue expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
    /// Action code (1 = BUY, 0 = SELL).
    pub action: u8,
    /// Venue symbol.
    pub symbol: String,
    /// Volume in shares.
    pub volume: f64,
    /// Order type code (0 = MARKET, 2 = BUY_LIMIT, 3 = SELL_LIMIT).
    #[serde(rename = "type")]
    pub order_type: u8,
    /// Limit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Stop loss.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sl: Option<f64>,
    /// Take profit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp: Option<f64>,
    /// Engine tag.
    pub magic: u32,
    /// Traceability comment (`swx-{SIDE}-{order suffix}`).
    pub comment: String,
    /// Expiration policy.
    pub type_time: u8,
    /// Filling policy.
    pub type_filling: u8,
}
