//! Shared error kinds for the DMP workspace.
//!
//! Mirrors `util/errors.go` from the original implementation: a small,
//! flat set of error kinds rather than one per crate. Individual crates
//! add their own I/O-wrapping variants and convert into these where the
//! spec names a specific failure (`FramingError`, `InvalidProtocol`, …).

use thiserror::Error;

/// Core error kinds (§7).
#[derive(Debug, Error)]
pub enum DmpError {
    /// Rejected input — `(name, value)`.
    #[error("invalid argument '{name}' with value '{value}'")]
    InvalidArgument { name: String, value: String },

    /// The wire frame violates the header/body length limits.
    #[error("framing error: expected at most {expected} header bytes, got {actual}")]
    FramingError { expected: i64, actual: i64 },

    /// The declared body length (or header length) is not a sane frame size.
    #[error("message too long: expected {expected}, got {actual}")]
    MessageTooLong { expected: i64, actual: i64 },

    /// Header flag value outside {sync, async}, or an unexpected protocol sequence.
    #[error("invalid protocol: {cause}")]
    InvalidProtocol { cause: String },

    /// At least one peer failed to send or ack during a multicast.
    #[error("incomplete multicast, failed peers: {failed:?}")]
    IncompleteMulticast { failed: Vec<String> },

    /// `Request`/`Notificate` found no Alive service for the namespace.
    #[error("namespace not found: {namespace}")]
    NamespaceNotFound { namespace: String },

    /// `Publish` found no subscriber for the topic.
    #[error("topic has no subscribers: {topic}")]
    TopicHasNoSubscribers { topic: String },

    /// Wraps a failure from the underlying gossip library.
    #[error("discovery error: {0}")]
    Discovery(String),

    /// An I/O failure not otherwise classified above.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DmpResult<T> = Result<T, DmpError>;
