//! A framed pipe plus its peer address (§4.2 "Endpoint").
//!
//! Grounded on `comm/endpoint.go`. Endpoints are TCP-only, matching the
//! original: the hard core never needs a transport-agnostic endpoint, only
//! `FramedPipe` is kept generic (for tests).

use crate::message::Message;
use crate::pipe::FramedPipe;
use dmp_errors::DmpError;
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// One TCP connection, framed, with its remote address cached for error
/// reporting (`IncompleteMulticast` reports peer addresses, not sockets).
pub struct Endpoint {
    pipe: FramedPipe<TcpStream>,
    remote_addr: SocketAddr,
}

impl Endpoint {
    pub fn new(stream: TcpStream) -> std::io::Result<Self> {
        let remote_addr = stream.peer_addr()?;
        Ok(Endpoint {
            pipe: FramedPipe::new(stream),
            remote_addr,
        })
    }

    pub async fn send(&mut self, msg: &Message) -> Result<(), DmpError> {
        self.pipe.send(msg).await
    }

    pub async fn recv(&mut self) -> Result<Message, DmpError> {
        self.pipe.recv().await
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub async fn close(&mut self) -> Result<(), DmpError> {
        self.pipe.close().await
    }
}
