//! Order legs: the request sent to the venue and the result that comes back.

mod order_type;
mod request;
mod result;
mod side;
pub mod wire;

pub use order_type::OrderType;
pub use request::{DEFAULT_MAX_SLIPPAGE, DEFAULT_ORDER_TIMEOUT, OrderRequest};
pub use result::OrderResult;
pub use side::OrderSide;
pub use wire::WireRequest;
