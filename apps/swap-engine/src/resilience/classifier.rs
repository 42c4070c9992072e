//! Classification of venue result codes into retry reasons.
//!
//! Unknown codes are permanent: a code we do not recognise is never retried.

use super::RetryReason;

/// Venue result codes.
pub mod retcode {
    /// Order placed.
    pub const PLACED: u32 = 10008;
    /// Request completed.
    pub const DONE: u32 = 10009;
    /// Request partially completed.
    pub const DONE_PARTIAL: u32 = 10010;
    /// Requote.
    pub const REQUOTE: u32 = 10004;
    /// Request rejected by the trade server.
    pub const REJECT: u32 = 10006;
    /// Invalid request.
    pub const INVALID: u32 = 10013;
    /// Invalid volume.
    pub const INVALID_VOLUME: u32 = 10014;
    /// Invalid price.
    pub const INVALID_PRICE: u32 = 10015;
    /// Invalid stops.
    pub const INVALID_STOPS: u32 = 10016;
    /// Trading disabled.
    pub const TRADE_DISABLED: u32 = 10017;
    /// Market closed.
    pub const MARKET_CLOSED: u32 = 10018;
    /// Insufficient funds.
    pub const NO_MONEY: u32 = 10019;
    /// Too many requests.
    pub const TOO_MANY_REQUESTS: u32 = 10024;
    /// Connection to the trade server lost.
    pub const CONNECTION: u32 = 10027;
    /// Only real accounts allowed.
    pub const ONLY_REAL: u32 = 10028;
    /// Pending order limit reached.
    pub const LIMIT_ORDERS: u32 = 10029;
    /// Request timed out on the server.
    pub const TIMEOUT: u32 = 10031;
    /// Trade context busy.
    pub const CONTEXT_BUSY: u32 = 10032;
}

/// Map a venue result code to a retry reason.
///
/// Returns `None` for success codes and for every permanent or unknown code.
#[must_use]
pub const fn classify(code: u32) -> Option<RetryReason> {
    match code {
        retcode::CONNECTION | retcode::ONLY_REAL | retcode::LIMIT_ORDERS => {
            Some(RetryReason::NetworkError)
        }
        retcode::TIMEOUT | retcode::CONTEXT_BUSY => Some(RetryReason::Timeout),
        retcode::REQUOTE | retcode::REJECT => Some(RetryReason::ServerError),
        _ => None,
    }
}

/// Whether the code means the order reached the book.
#[must_use]
pub const fn is_success(code: u32) -> bool {
    matches!(code, retcode::DONE | retcode::DONE_PARTIAL | retcode::PLACED)
}

/// Human-readable description of a code.
#[must_use]
pub const fn describe(code: u32) -> &'static str {
    match code {
        retcode::PLACED => "order placed",
        retcode::DONE => "request completed",
        retcode::DONE_PARTIAL => "request partially completed",
        retcode::REQUOTE => "requote",
        retcode::REJECT => "request rejected",
        retcode::INVALID => "invalid request",
        retcode::INVALID_VOLUME => "invalid volume",
        retcode::INVALID_PRICE => "invalid price",
        retcode::INVALID_STOPS => "invalid stops",
        retcode::TRADE_DISABLED => "trading disabled",
        retcode::MARKET_CLOSED => "market closed",
        retcode::NO_MONEY => "insufficient funds",
        retcode::TOO_MANY_REQUESTS => "too many requests",
        retcode::CONNECTION => "no connection to trade server",
        retcode::ONLY_REAL => "operation allowed only for live accounts",
        retcode::LIMIT_ORDERS => "pending order limit reached",
        retcode::TIMEOUT => "request timed out",
        retcode::CONTEXT_BUSY => "trade context busy",
        _ => "unknown result code",
    }
}
