//! The "closable router" behavior (§11.2 `[SUPPLEMENT]`): once `Stop` has
//! been called, every request gets a plain-text "connection closed" body
//! instead of being dispatched.
//!
//! Grounded on `api/api.go`'s `closableRouter.ServeHTTP`. The original
//! checks a bare `bool` with no lock, so a request racing the `Close()`
//! call may or may not observe it — this uses `Ordering::Relaxed` on an
//! `AtomicBool` for the same "eventually visible, not synchronized" intent
//! (§9 open question).

use crate::state::AppState;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::atomic::Ordering;

pub async fn reject_when_closed(State(state): State<AppState>, request: Request<axum::body::Body>, next: Next) -> Response {
    if state.closed.load(Ordering::Relaxed) {
        return "connection closed".into_response();
    }
    next.run(request).await
}
