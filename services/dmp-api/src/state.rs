use dmp_router::Router;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    /// Flipped by [`crate::ApiServer::stop`]. Read without synchronization
    /// in the closable-router middleware, matching the unsynchronized-read
    /// intent of the original `api.go`'s `closed bool` field (§9 open
    /// question: visibility is not guaranteed to be immediate across
    /// threads, and that's acceptable here).
    pub closed: Arc<AtomicBool>,
}
