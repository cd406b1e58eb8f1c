//! Wire-level primitives for the DMP message bus: the length-prefixed
//! frame codec (`FramedPipe`), the shareable `Message` type, and
//! `Endpoint`, a framed TCP connection tagged with its peer address.

mod endpoint;
mod message;
mod pipe;

pub use endpoint::Endpoint;
pub use message::{ACKS_BODY, HEADER_LIMIT, Message};
pub use pipe::FramedPipe;
