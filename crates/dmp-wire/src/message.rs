//! The wire message unit (§3 "Message (wire)").
//!
//! The original Go implementation (`comm/message.go`) tracks an explicit
//! atomic refcount so `Multi.Send` can fan one payload out to many
//! endpoints and free it once every goroutine is done with it. In Rust the
//! same lifecycle — duplicate, use independently, release, idempotent once
//! the last handle drops — is exactly what `Arc` already gives us, so
//! `Message` is a thin, cheaply-cloneable handle around a shared body.

use std::sync::Arc;

/// Maximum header length accepted on receive, and enforced symmetrically
/// on send (§9 open question: "keep send-side length bounded by the same
/// limit for symmetry").
pub const HEADER_LIMIT: usize = 4;

/// The literal ack body sent back for an async (`Noti`) exchange.
pub const ACKS_BODY: &[u8; 4] = b"ACKS";

#[derive(Debug)]
struct MessageInner {
    header: Vec<u8>,
    body: Vec<u8>,
}

/// A frame body/header pair, shareable across concurrent sends.
///
/// `dup()` is the `Arc::clone` equivalent of the original's `Message.Dup`;
/// dropping the last clone frees the underlying buffers, which is the
/// idiomatic replacement for the original's manual `Free`.
#[derive(Debug, Clone)]
pub struct Message {
    inner: Arc<MessageInner>,
}

impl Message {
    /// Build a message from an application payload with an empty header.
    pub fn from_body(body: Vec<u8>) -> Self {
        Message {
            inner: Arc::new(MessageInner {
                header: Vec::new(),
                body,
            }),
        }
    }

    /// Build a message from explicit header and body bytes, e.g. when
    /// replaying a frame straight off the wire.
    pub fn new(header: Vec<u8>, body: Vec<u8>) -> Self {
        Message {
            inner: Arc::new(MessageInner { header, body }),
        }
    }

    /// A message carrying a given header appended to an existing payload.
    ///
    /// Protocols call this to stamp the sync/async flag onto an
    /// application payload without mutating the caller's copy.
    pub fn with_header(body: Vec<u8>, flag: u8) -> Self {
        Message::new(vec![flag], body)
    }

    pub fn header(&self) -> &[u8] {
        &self.inner.header
    }

    pub fn body(&self) -> &[u8] {
        &self.inner.body
    }

    pub fn into_body(self) -> Vec<u8> {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => inner.body,
            Err(shared) => shared.body.clone(),
        }
    }

    /// Duplicate this message for an independent per-peer send (Multi
    /// fan-out). Equivalent to the original's `refCount+1`.
    #[must_use]
    pub fn dup(&self) -> Self {
        self.clone()
    }
}

impl From<Vec<u8>> for Message {
    fn from(body: Vec<u8>) -> Self {
        Message::from_body(body)
    }
}
