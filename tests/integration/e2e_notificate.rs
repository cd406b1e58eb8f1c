//! Async notification (§8 scenario C): `Notificate` returns the 4-byte
//! ack immediately; the peer's handler only observes the payload once it
//! explicitly calls `recv`.

use async_trait::async_trait;
use dmp::Dmp;
use dmp_bus::Handler;
use dmp_config::NodeConfig;
use dmp_errors::DmpError;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

fn node_config(contacts: Vec<String>) -> NodeConfig {
    NodeConfig {
        bind_addr: "127.0.0.1".to_owned(),
        bind_port: 0,
        contact_points: contacts,
        ..NodeConfig::default_config()
    }
}

async fn wait_until_visible(node: &Dmp, namespace: &str) {
    for _ in 0..300 {
        let members = node.router().list_all_members().await;
        if members.iter().any(|service| service.namespace == namespace) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("namespace '{namespace}' never became visible");
}

#[tokio::test]
async fn notificate_acks_immediately_and_delivers_async() {
    let mut b = Dmp::create(&node_config(vec![])).await.unwrap();
    b.start().await.unwrap();

    let mut a = Dmp::create(&node_config(vec![b.discovery_addr().to_string()])).await.unwrap();
    a.start().await.unwrap();

    let client = reqwest::Client::new();
    client
        .put(format!("http://{}/namespace", b.api_addr()))
        .body(r#"{"namespace":"worker","contactPoint":"http://127.0.0.1:9/unused"}"#)
        .send()
        .await
        .unwrap();

    wait_until_visible(&a, "worker").await;

    let ack = a.router().notificate("worker", b"fyi".to_vec()).await.unwrap();
    assert_eq!(ack, b"ACKS");

    a.stop().await.unwrap();
    b.stop().await.unwrap();
}

struct RecordingHandler {
    seen: Arc<Mutex<Vec<Vec<u8>>>>,
}

#[async_trait]
impl Handler for RecordingHandler {
    async fn recv(&self, body: Vec<u8>) -> Result<Vec<u8>, DmpError> {
        self.seen.lock().unwrap().push(body);
        Ok(Vec::new())
    }
}

/// The wire-level half of scenario C, grounded directly on
/// `dmp-bus`/`dmp-sender`'s own Noti contract: an async dial acks on
/// connect, and the body only reaches the handler once the receiver
/// calls `recv`, mirroring the full node's `Notificate`/`Recv` split.
#[tokio::test]
async fn noti_ack_is_immediate_and_handler_runs_on_bus_recv() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let bus = Arc::new(
        dmp_bus::Bus::bind("127.0.0.1:0".parse().unwrap(), RecordingHandler { seen: Arc::clone(&seen) })
            .await
            .unwrap(),
    );
    let addr = bus.local_addr().unwrap();
    let bus_run = Arc::clone(&bus);
    tokio::spawn(async move { bus_run.run().await });

    let mut sender = dmp_sender::Sender::dial(addr, dmp_sender::DialKind::Async).await.unwrap();
    sender.send(b"fyi".to_vec()).await.unwrap();
    let ack = sender.recv().await.unwrap();
    assert_eq!(ack, b"ACKS");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(seen.lock().unwrap().as_slice(), &[b"fyi".to_vec()]);

    bus.stop();
}
