//! Domain Layer
//!
//! Value objects and entities with no I/O. Everything here is plain data plus
//! pure functions; orchestration lives in the application layer.
//!
//! - [`order`]: one leg of a swap, its venue wire format and its result
//! - [`execution`]: the swap request, aggregate result and audit events
//! - [`shared`]: identifiers

pub mod execution;
pub mod order;
pub mod shared;
