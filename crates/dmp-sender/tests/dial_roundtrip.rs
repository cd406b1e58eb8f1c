use dmp_sender::{DialKind, Sender};
use dmp_wire::{ACKS_BODY, FramedPipe, Message};
use tokio::net::TcpListener;

#[tokio::test]
async fn sync_dial_round_trips_a_reply() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut pipe = FramedPipe::new(stream);
        let request = pipe.recv().await.unwrap();
        assert_eq!(request.header(), b"0");
        pipe.send(&Message::from_body(b"pong".to_vec())).await.unwrap();
    });

    let mut sender = Sender::dial(addr, DialKind::Sync).await.unwrap();
    sender.send(b"ping".to_vec()).await.unwrap();
    let reply = sender.recv().await.unwrap();
    assert_eq!(reply, b"pong");
}

#[tokio::test]
async fn async_dial_reads_its_ack_only_when_the_caller_asks() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut pipe = FramedPipe::new(stream);
        let request = pipe.recv().await.unwrap();
        assert_eq!(request.header(), b"1");
        pipe.send(&Message::new(Vec::new(), ACKS_BODY.to_vec()))
            .await
            .unwrap();
    });

    let mut sender = Sender::dial(addr, DialKind::Async).await.unwrap();
    sender.send(b"fire and forget".to_vec()).await.unwrap();

    let ack = sender.recv().await.unwrap();
    assert_eq!(ack, ACKS_BODY.as_slice());
}

#[tokio::test]
async fn multi_dial_opens_exactly_one_connection_per_address() {
    let mut listeners = Vec::new();
    let mut addrs = Vec::new();
    for _ in 0..3 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        addrs.push(listener.local_addr().unwrap());
        listeners.push(listener);
    }

    for listener in listeners {
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut pipe = FramedPipe::new(stream);
            let _req = pipe.recv().await.unwrap();
            pipe.send(&Message::new(Vec::new(), ACKS_BODY.to_vec()))
                .await
                .unwrap();
        });
    }

    let mut sender = Sender::multi_dial(&addrs).await.unwrap();
    sender.send(b"announcement".to_vec()).await.unwrap();
}
