//! The HTTP admin/data-plane edge (§6.2, `[SUPPLEMENT] 11.2`).
//!
//! Grounded on `api/api.go`'s `ApiServer`/`closableRouter`, reimplemented
//! as an `axum::Router` in the style of `server::http::*` and
//! `receiver::control_api`.

mod closable;
mod dto;
mod response;
mod routes;
mod state;

pub use state::AppState;

use dmp_errors::DmpError;
use dmp_router::Router as DmpRouter;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;

pub fn build_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/namespace", axum::routing::get(routes::list_all_members).put(routes::service_register))
        .route(
            "/namespace/:namespace",
            axum::routing::get(routes::list_members).delete(routes::service_unregister),
        )
        .route("/message/reqRes/:namespace", axum::routing::put(routes::request))
        .route("/message/pubSub/:topic", axum::routing::put(routes::publish))
        .route("/message/noti/:namespace", axum::routing::put(routes::notificate))
        .route(
            "/topic/:topicName/subscriber",
            axum::routing::put(routes::subscribe_topic).delete(routes::unsubscribe_topic),
        )
        .layer(axum::middleware::from_fn_with_state(state.clone(), closable::reject_when_closed))
        .with_state(state)
}

/// A handle to stop accepting live requests on a running [`ApiServer`]
/// without tearing down its listener, matching `ApiServer.Stop`'s
/// flip-a-flag semantics in the original.
#[derive(Clone)]
pub struct ApiHandle {
    closed: Arc<AtomicBool>,
}

impl ApiHandle {
    pub fn stop(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}

pub struct ApiServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: AppState,
}

impl ApiServer {
    /// Bind `addr`; if that fails and a specific port was requested, retry
    /// once on an OS-chosen ephemeral port, matching the comm bus's own
    /// bind policy rather than failing outright on a busy `:8080`.
    pub async fn bind(addr: SocketAddr, router: Arc<DmpRouter>) -> Result<(Self, ApiHandle), DmpError> {
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(err) if addr.port() != 0 => {
                tracing::warn!(%addr, %err, "bind failed, retrying on an ephemeral port");
                let mut retry_addr = addr;
                retry_addr.set_port(0);
                TcpListener::bind(retry_addr).await?
            }
            Err(err) => return Err(err.into()),
        };
        let local_addr = listener.local_addr()?;
        let closed = Arc::new(AtomicBool::new(false));
        let state = AppState { router, closed: Arc::clone(&closed) };
        Ok((ApiServer { listener, local_addr, state }, ApiHandle { closed }))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until the listener itself errors out; the closable-router
    /// middleware, not this future, is what makes `Stop` observable.
    pub async fn run(self) -> std::io::Result<()> {
        let app = build_router(self.state);
        axum::serve(self.listener, app).await
    }
}
