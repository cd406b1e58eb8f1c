//! The accept loop and connection pool (§4.4 "Bus").
//!
//! Grounded on `comm/bus.go`: bind with an ephemeral-port retry policy,
//! spawn one task per accepted connection, track the pool so `stop` can
//! tear down every in-flight connection. The original unblocks a
//! goroutine-blocked `AcceptTCP` by closing the listening socket out from
//! under it; tokio gives `accept` no such out-of-band cancellation, so
//! `run` instead selects between `accept` and a `watch` channel flipped by
//! `stop`, the idiomatic replacement for the same intent.

use crate::handler::Handler;
use dmp_errors::DmpError;
use dmp_protocol::Res;
use dmp_wire::{Endpoint, Message};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// The message bus's default listen port (§6.5), matching `dmp/dmp.go`'s
/// `DEFAULT_COMM_PORT`.
pub const DEFAULT_COMM_PORT: u16 = 30000;

pub struct Bus<H: Handler> {
    listener: TcpListener,
    handler: Arc<H>,
    pool: Mutex<HashMap<u64, AbortHandle>>,
    next_id: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<H: Handler> Bus<H> {
    /// Bind `addr`; if that fails and a specific port was requested, retry
    /// once on an OS-chosen ephemeral port rather than giving up outright.
    pub async fn bind(addr: SocketAddr, handler: H) -> Result<Self, DmpError> {
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

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Bus {
            listener,
            handler: Arc::new(handler),
            pool: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `stop` is called or the listener errors
    /// out. Each connection is handled on its own task: one request, one
    /// reply (or ack), then close (§4.4 "single exchange then close").
    pub async fn run(self: &Arc<Self>) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => break,
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _peer)) => self.spawn_connection(stream),
                        Err(err) => {
                            tracing::error!(%err, "accept failed");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn spawn_connection(self: &Arc<Self>, stream: TcpStream) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let bus = Arc::clone(self);
        let handle = tokio::spawn(async move {
            bus.handle_connection(stream).await;
            bus.pool.lock().unwrap().remove(&id);
        });
        self.pool.lock().unwrap().insert(id, handle.abort_handle());
    }

    async fn handle_connection(&self, stream: TcpStream) {
        let endpoint = match Endpoint::new(stream) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                tracing::error!(%err, "failed to wrap accepted connection");
                return;
            }
        };

        let mut res = Res::new(endpoint);
        let request = match res.recv().await {
            Ok(msg) => msg,
            Err(err) => {
                tracing::error!(%err, "recv failed");
                return;
            }
        };

        match self.handler.recv(request.body().to_vec()).await {
            Ok(reply_body) => {
                if let Err(err) = res.send(&Message::from_body(reply_body)).await {
                    tracing::error!(%err, "send failed");
                }
            }
            Err(err) => tracing::error!(%err, "handler failed"),
        }

        let _ = res.close().await;
    }

    /// Stop accepting new connections and abort every in-flight one. The
    /// pool is left empty; `run`'s next loop iteration observes the
    /// shutdown signal and returns.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        let mut pool = self.pool.lock().unwrap();
        for (_, handle) in pool.drain() {
            handle.abort();
        }
    }

    pub fn active_connections(&self) -> usize {
        self.pool.lock().unwrap().len()
    }
}
