use crate::ASYNC_FLAG;
use dmp_errors::DmpError;
use dmp_wire::{Endpoint, Message};

/// The asynchronous client role: stamp a payload with the async flag and
/// send it. The peer's ack (§4.3 literal `ACKS` body) only comes back if
/// the caller explicitly calls `recv` afterward — `Notificate` does, a
/// pure fire-and-forget `Publish` never does.
pub struct Noti {
    ep: Endpoint,
}

impl Noti {
    pub fn new(ep: Endpoint) -> Self {
        Noti { ep }
    }

    pub async fn send(&mut self, msg: &Message) -> Result<(), DmpError> {
        let flagged = Message::new(vec![ASYNC_FLAG], msg.body().to_vec());
        self.ep.send(&flagged).await
    }

    pub async fn recv(&mut self) -> Result<Message, DmpError> {
        self.ep.recv().await
    }

    pub async fn close(&mut self) -> Result<(), DmpError> {
        self.ep.close().await
    }
}
