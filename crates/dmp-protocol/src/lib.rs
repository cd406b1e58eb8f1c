//! Protocol roles (§4.3): small state machines layered over one or more
//! `Endpoint`s that add the one-byte sync/async flag and implement the
//! ack discipline each interaction style needs.
//!
//! Grounded on `comm/protocol.go`. The original expresses all four roles
//! through one `Conn` struct switched on a `ConnType` enum; here each role
//! is its own small type so the compiler enforces which operations are
//! valid in which state instead of checking a tag at runtime.

mod multi;
mod noti;
mod req;
mod res;

pub use multi::Multi;
pub use noti::Noti;
pub use req::Req;
pub use res::{Res, ResState};

/// One-byte header flag marking a synchronous (request/response) exchange.
pub const SYNC_FLAG: u8 = b'0';

/// One-byte header flag marking an asynchronous (fire-and-forget) exchange.
pub const ASYNC_FLAG: u8 = b'1';
