//! Bus accept-close liveness (§8 invariant 8 / scenario F): after `Stop`,
//! every pooled connection is closed and the accept loop has exited.

use async_trait::async_trait;
use dmp_bus::{Bus, Handler};
use dmp_errors::DmpError;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

struct NeverReplies;

#[async_trait]
impl Handler for NeverReplies {
    async fn recv(&self, body: Vec<u8>) -> Result<Vec<u8>, DmpError> {
        Ok(body)
    }
}

#[tokio::test]
async fn stop_closes_every_pooled_connection_and_accept_exits() {
    let bus = Arc::new(Bus::bind("127.0.0.1:0".parse().unwrap(), NeverReplies).await.unwrap());
    let addr = bus.local_addr().unwrap();

    let bus_run = Arc::clone(&bus);
    let accept_loop = tokio::spawn(async move { bus_run.run().await });

    let mut clients = Vec::new();
    for _ in 0..3 {
        clients.push(TcpStream::connect(addr).await.unwrap());
    }

    // Give the accept loop a moment to register each connection in the pool.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(bus.active_connections(), 3);

    bus.stop();

    let result = tokio::time::timeout(Duration::from_secs(2), accept_loop).await;
    assert!(result.is_ok(), "accept loop did not exit after stop");

    for mut client in clients {
        let mut buf = [0u8; 1];
        let read = tokio::time::timeout(Duration::from_secs(2), client.read(&mut buf)).await;
        let n = read.expect("client read timed out").unwrap();
        assert_eq!(n, 0, "expected EOF after stop");
    }

    assert_eq!(bus.active_connections(), 0);
}
