//! Request round-trip (§8 scenario A): two full nodes, one registers a
//! namespace backed by a local HTTP service, the other dispatches a
//! request and observes the reply.

use axum::extract::State;
use axum::routing::put;
use dmp::Dmp;
use dmp_config::NodeConfig;
use std::time::Duration;

async fn pong(State(_): State<()>, body: axum::body::Bytes) -> Vec<u8> {
    assert_eq!(&body[..], b"ping");
    b"pong".to_vec()
}

async fn start_contact_point() -> String {
    let app = axum::Router::new().route("/worker", put(pong)).with_state(());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/worker")
}

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
async fn a_requests_worker_and_receives_pong() {
    let mut b = Dmp::create(&node_config(vec![])).await.unwrap();
    b.start().await.unwrap();

    let mut a = Dmp::create(&node_config(vec![b.discovery_addr().to_string()])).await.unwrap();
    a.start().await.unwrap();

    let contact_point = start_contact_point().await;
    let client = reqwest::Client::new();
    client
        .put(format!("http://{}/namespace", b.api_addr()))
        .body(format!(r#"{{"namespace":"worker","contactPoint":"{contact_point}"}}"#))
        .send()
        .await
        .unwrap();

    wait_until_visible(&a, "worker").await;

    let reply = a.router().request("worker", b"ping".to_vec()).await.unwrap();
    assert_eq!(reply, b"pong");

    a.stop().await.unwrap();
    b.stop().await.unwrap();
}
