//! The TCP listener and per-connection dispatch layer of the DMP message
//! bus (§4.4).

mod bus;
mod handler;

pub use bus::{Bus, DEFAULT_COMM_PORT};
pub use handler::Handler;
