use crate::SYNC_FLAG;
use dmp_errors::DmpError;
use dmp_wire::{Endpoint, Message};

/// The synchronous client role: stamp a payload with the sync flag, send
/// it, and block for the single reply it expects back.
pub struct Req {
    ep: Endpoint,
}

impl Req {
    pub fn new(ep: Endpoint) -> Self {
        Req { ep }
    }

    pub async fn send(&mut self, msg: &Message) -> Result<(), DmpError> {
        let flagged = Message::new(vec![SYNC_FLAG], msg.body().to_vec());
        self.ep.send(&flagged).await
    }

    pub async fn recv(&mut self) -> Result<Message, DmpError> {
        self.ep.recv().await
    }

    pub async fn close(&mut self) -> Result<(), DmpError> {
        self.ep.close().await
    }
}
