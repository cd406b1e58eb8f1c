use crate::ASYNC_FLAG;
use dmp_errors::DmpError;
use dmp_wire::{Endpoint, Message};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// The multicast client role (§4.3 "Multi"): fan one payload out to every
/// subscriber endpoint concurrently and wait for every ack.
///
/// Grounded on `comm/protocol.go`'s `Multi.Send`, which spawns one
/// goroutine per endpoint and collects acks over a channel sized to the
/// endpoint count. Here each peer gets its own `tokio::task`; a bounded
/// `mpsc` channel of the same cardinality collects the per-peer outcome,
/// and a `JoinSet` hands every endpoint back so `Multi` can be reused or
/// closed afterward.
pub struct Multi {
    eps: Vec<Endpoint>,
}

impl Multi {
    pub fn new(eps: Vec<Endpoint>) -> Self {
        Multi { eps }
    }

    pub fn len(&self) -> usize {
        self.eps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eps.is_empty()
    }

    /// Send `msg` to every endpoint and wait for every ack. Returns
    /// `IncompleteMulticast` naming every peer that failed to send or
    /// ack; endpoints that succeeded and the ones that failed are both
    /// retained for the next call.
    pub async fn send(&mut self, msg: &Message) -> Result<(), DmpError> {
        let flagged = Message::new(vec![ASYNC_FLAG], msg.body().to_vec());
        let eps = std::mem::take(&mut self.eps);
        let n = eps.len();

        if n == 0 {
            return Ok(());
        }

        let (ack_tx, mut ack_rx) = mpsc::channel::<String>(n);
        let mut set = JoinSet::new();

        for ep in eps {
            let dup_msg = flagged.dup();
            let ack_tx = ack_tx.clone();
            set.spawn(async move {
                let mut ep = ep;
                let addr = ep.remote_addr();
                let outcome = async {
                    ep.send(&dup_msg).await?;
                    ep.recv().await?;
                    Ok::<(), DmpError>(())
                }
                .await;

                let report = match outcome {
                    Ok(()) => String::new(),
                    Err(_) => addr.to_string(),
                };
                let _ = ack_tx.send(report).await;
                ep
            });
        }
        drop(ack_tx);

        let mut failed = Vec::new();
        for _ in 0..n {
            if let Some(report) = ack_rx.recv().await
                && !report.is_empty()
            {
                failed.push(report);
            }
        }

        let mut eps_back = Vec::with_capacity(n);
        while let Some(joined) = set.join_next().await {
            if let Ok(ep) = joined {
                eps_back.push(ep);
            }
        }
        self.eps = eps_back;

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DmpError::IncompleteMulticast { failed })
        }
    }

    pub async fn close(&mut self) {
        for ep in &mut self.eps {
            let _ = ep.close().await;
        }
    }
}
