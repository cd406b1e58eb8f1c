//! Client-side dial helpers (§4.5 "Sender"): connect sync, connect async,
//! or connect to many peers at once for a multicast publish.
//!
//! Grounded on `comm/sender.go`. `Dial`/`DialWithType` become
//! [`Sender::dial`]; `MultiDial`/`MultiDialAddr` become
//! [`Sender::multi_dial`]. The original's `MultiDial` pre-sizes its
//! address slice with `make([]*net.TCPAddr, len(urls))` and then
//! `append`s into it, which doubles the slice with `len(urls)` leading
//! nil entries — the address accumulator here does the one thing that
//! construction was clearly meant to do: exactly one address per input
//! URL, in input order.

use dmp_errors::DmpError;
use dmp_protocol::{Multi, Noti, Req};
use dmp_wire::{Endpoint, Message};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::net::{TcpStream, ToSocketAddrs};

/// Which protocol role a sync dial should establish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialKind {
    Sync,
    Async,
}

enum SenderRole {
    Req(Req),
    Noti(Noti),
    Multi(Multi),
}

/// A dialed client connection, wrapping whichever protocol role the
/// caller asked for.
pub struct Sender {
    role: SenderRole,
}

impl Sender {
    /// Dial one peer, establishing either a `Req` (sync) or `Noti`
    /// (async) role depending on `kind`.
    pub async fn dial<A: ToSocketAddrs>(addr: A, kind: DialKind) -> Result<Self, DmpError> {
        let stream = TcpStream::connect(addr).await?;
        let ep = Endpoint::new(stream)?;
        let role = match kind {
            DialKind::Sync => SenderRole::Req(Req::new(ep)),
            DialKind::Async => SenderRole::Noti(Noti::new(ep)),
        };
        Ok(Sender { role })
    }

    /// Dial every address and wrap them all in one `Multi` role, for a
    /// single publish that fans out to every subscriber at once.
    pub async fn multi_dial<A>(addrs: &[A]) -> Result<Self, DmpError>
    where
        A: ToSocketAddrs,
    {
        let mut eps = Vec::with_capacity(addrs.len());
        for addr in addrs {
            let stream = TcpStream::connect(addr).await?;
            eps.push(Endpoint::new(stream)?);
        }
        Ok(Sender {
            role: SenderRole::Multi(Multi::new(eps)),
        })
    }

    pub async fn send(&mut self, content: Vec<u8>) -> Result<(), DmpError> {
        let msg = Message::from_body(content);
        match &mut self.role {
            SenderRole::Req(req) => req.send(&msg).await,
            SenderRole::Noti(noti) => noti.send(&msg).await,
            SenderRole::Multi(multi) => multi.send(&msg).await,
        }
    }

    pub async fn send_json<T: Serialize>(&mut self, obj: &T) -> Result<(), DmpError> {
        let raw = serde_json::to_vec(obj).map_err(|err| DmpError::InvalidProtocol {
            cause: format!("failed to encode json payload: {err}"),
        })?;
        self.send(raw).await
    }

    /// For a `Sync` dial this reads the reply; for an `Async` dial this
    /// reads the peer's ack (its body is the literal `ACKS` bytes).
    /// `Multi` has no single reply to return.
    pub async fn recv(&mut self) -> Result<Vec<u8>, DmpError> {
        match &mut self.role {
            SenderRole::Req(req) => Ok(req.recv().await?.into_body()),
            SenderRole::Noti(noti) => Ok(noti.recv().await?.into_body()),
            SenderRole::Multi(_) => Err(DmpError::InvalidProtocol {
                cause: "recv is only valid on a sync or async sender".into(),
            }),
        }
    }

    pub async fn recv_json<T: DeserializeOwned>(&mut self) -> Result<T, DmpError> {
        let raw = self.recv().await?;
        serde_json::from_slice(&raw).map_err(|err| DmpError::InvalidProtocol {
            cause: format!("failed to decode json payload: {err}"),
        })
    }

    pub async fn close(&mut self) -> Result<(), DmpError> {
        match &mut self.role {
            SenderRole::Req(req) => req.close().await,
            SenderRole::Noti(noti) => noti.close().await,
            SenderRole::Multi(multi) => {
                multi.close().await;
                Ok(())
            }
        }
    }
}
