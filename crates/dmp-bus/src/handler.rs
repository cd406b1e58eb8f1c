use async_trait::async_trait;
use dmp_errors::DmpError;
use std::sync::Arc;

/// Application callback invoked once per accepted connection with the
/// request body; its return value becomes the sync reply (§4.4 "Handler").
///
/// Grounded on `comm/bus.go`'s `Handler` interface (`Recv([]byte) ([]byte,
/// error)`); `async-trait` is the idiomatic way to express an
/// object-safe async trait, matching the pattern used throughout the
/// broader gossip/network corpus this crate draws on.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn recv(&self, body: Vec<u8>) -> Result<Vec<u8>, DmpError>;
}

/// Lets a shared `Arc<Router>` (or any other `Arc<Handler>`) be handed to
/// [`crate::Bus::bind`] directly, so the same instance can also be held
/// outside the bus (e.g. by the HTTP edge) for `Request`/`Publish`/…
#[async_trait]
impl<T: Handler> Handler for Arc<T> {
    async fn recv(&self, body: Vec<u8>) -> Result<Vec<u8>, DmpError> {
        (**self).recv(body).await
    }
}
