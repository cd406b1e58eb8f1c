use crate::{ASYNC_FLAG, SYNC_FLAG};
use dmp_errors::DmpError;
use dmp_wire::{ACKS_BODY, Endpoint, Message};

/// Where a `Res` sits within its one request/response exchange.
///
/// A `Res` handles exactly one exchange then is dropped (§4.4 "single
/// exchange then close"); the state only tracks whether `recv` has run
/// yet, and if so, which flag it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResState {
    AwaitingRequest,
    AwaitingReply,
    RepliedAsync,
}

/// The server-side role (§4.3 "Res"): reads one request, inspects its
/// flag, and either auto-acks (async) or waits for the handler to supply
/// the reply (sync).
pub struct Res {
    ep: Endpoint,
    state: ResState,
}

impl Res {
    pub fn new(ep: Endpoint) -> Self {
        Res {
            ep,
            state: ResState::AwaitingRequest,
        }
    }

    pub fn state(&self) -> ResState {
        self.state
    }

    /// Read the request. For an async request this also sends the ack
    /// immediately, since the caller (`dmp-bus`) never gets a reply to
    /// forward for that flag.
    pub async fn recv(&mut self) -> Result<Message, DmpError> {
        if self.state != ResState::AwaitingRequest {
            return Err(DmpError::InvalidProtocol {
                cause: "recv called more than once on a Res".into(),
            });
        }

        let msg = self.ep.recv().await?;
        match msg.header() {
            [flag] if *flag == SYNC_FLAG => {
                self.state = ResState::AwaitingReply;
                Ok(msg)
            }
            [flag] if *flag == ASYNC_FLAG => {
                self.state = ResState::RepliedAsync;
                self.ep
                    .send(&Message::new(Vec::new(), ACKS_BODY.to_vec()))
                    .await?;
                Ok(msg)
            }
            other => Err(DmpError::InvalidProtocol {
                cause: format!("unrecognized sync/async flag {other:?}"),
            }),
        }
    }

    /// Send the reply for a sync exchange. A no-op for an async exchange,
    /// which already got its ack in `recv`; an error if called before
    /// `recv`.
    pub async fn send(&mut self, msg: &Message) -> Result<(), DmpError> {
        match self.state {
            ResState::RepliedAsync => Ok(()),
            ResState::AwaitingReply => self.ep.send(msg).await,
            ResState::AwaitingRequest => Err(DmpError::InvalidProtocol {
                cause: "send called before recv on a Res".into(),
            }),
        }
    }

    pub async fn close(&mut self) -> Result<(), DmpError> {
        self.ep.close().await
    }
}
