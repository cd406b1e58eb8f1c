//! Multi-subscribe publish (§8 scenario B): two subscribers of the same
//! topic both receive a published message; publishing to an unsubscribed
//! topic fails with `TopicHasNoSubscribers`.

use axum::extract::State;
use axum::routing::put;
use dmp::Dmp;
use dmp_config::NodeConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

async fn echo_counter(State(counter): State<Arc<AtomicUsize>>, body: axum::body::Bytes) -> Vec<u8> {
    assert_eq!(&body[..], b"hello");
    counter.fetch_add(1, Ordering::SeqCst);
    b"ok".to_vec()
}

async fn start_contact_point() -> (String, Arc<AtomicUsize>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let app = axum::Router::new().route("/sub", put(echo_counter)).with_state(Arc::clone(&counter));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}/sub"), counter)
}

fn node_config(contacts: Vec<String>) -> NodeConfig {
    NodeConfig {
        bind_addr: "127.0.0.1".to_owned(),
        bind_port: 0,
        contact_points: contacts,
        ..NodeConfig::default_config()
    }
}

async fn register(node: &Dmp, namespace: &str, contact_point: &str) {
    let client = reqwest::Client::new();
    client
        .put(format!("http://{}/namespace", node.api_addr()))
        .body(format!(r#"{{"namespace":"{namespace}","contactPoint":"{contact_point}"}}"#))
        .send()
        .await
        .unwrap();
}

async fn subscribe(node: &Dmp, topic: &str) {
    let client = reqwest::Client::new();
    let response = client.put(format!("http://{}/topic/{topic}/subscriber", node.api_addr())).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

async fn wait_until_subscribed(node: &Dmp, topic: &str, count: usize) {
    for _ in 0..300 {
        let grouped = node.router().list_all_members().await;
        let subscribed = grouped.iter().filter(|service| service.topics.contains(topic)).count();
        if subscribed >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("fewer than {count} members subscribed to '{topic}' in time");
}

#[tokio::test]
async fn publish_reaches_every_subscriber() {
    let mut a = Dmp::create(&node_config(vec![])).await.unwrap();
    a.start().await.unwrap();

    let mut b = Dmp::create(&node_config(vec![a.discovery_addr().to_string()])).await.unwrap();
    b.start().await.unwrap();

    let mut c = Dmp::create(&node_config(vec![a.discovery_addr().to_string()])).await.unwrap();
    c.start().await.unwrap();

    let (contact_b, counter_b) = start_contact_point().await;
    let (contact_c, counter_c) = start_contact_point().await;

    register(&b, "worker-b", &contact_b).await;
    register(&c, "worker-c", &contact_c).await;
    subscribe(&b, "t").await;
    subscribe(&c, "t").await;

    wait_until_subscribed(&a, "t", 2).await;

    let reply = a.router().publish("t", b"hello".to_vec()).await.unwrap();
    assert_eq!(reply, b"send");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(counter_b.load(Ordering::SeqCst), 1);
    assert_eq!(counter_c.load(Ordering::SeqCst), 1);

    a.stop().await.unwrap();
    b.stop().await.unwrap();
    c.stop().await.unwrap();
}

#[tokio::test]
async fn publish_with_no_subscribers_fails() {
    let mut a = Dmp::create(&node_config(vec![])).await.unwrap();
    a.start().await.unwrap();

    let err = a.router().publish("nobody-home", b"hello".to_vec()).await.unwrap_err();
    assert!(matches!(err, dmp_errors::DmpError::TopicHasNoSubscribers { topic } if topic == "nobody-home"));

    a.stop().await.unwrap();
}
