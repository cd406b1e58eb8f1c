//! Length-prefixed frame codec (§4.1 "Framed Pipe").
//!
//! Grounded on `comm/pipe.go`: two big-endian `u64` length prefixes
//! (header length, body length) followed by the header and body bytes.
//! `bodyLen` is transmitted as an unsigned integer but interpreted as
//! signed on read, so a value with the high bit set is rejected as a
//! framing error rather than silently treated as a multi-exabyte body.

use crate::message::{HEADER_LIMIT, Message};
use dmp_errors::DmpError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A framed pipe over one reliable, ordered byte stream.
///
/// Generic over the underlying stream so unit tests can drive it over
/// `tokio::io::duplex` without opening real sockets; `dmp-bus` and
/// `dmp-sender` instantiate it over `tokio::net::TcpStream`.
pub struct FramedPipe<S> {
    stream: S,
}

impl<S> FramedPipe<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        FramedPipe { stream }
    }

    /// Write `headerLen | bodyLen | header | body`, in that order.
    pub async fn send(&mut self, msg: &Message) -> Result<(), DmpError> {
        let header = msg.header();
        let body = msg.body();

        if header.len() > HEADER_LIMIT {
            return Err(DmpError::FramingError {
                expected: HEADER_LIMIT as i64,
                actual: header.len() as i64,
            });
        }

        self.stream.write_u64(header.len() as u64).await?;
        self.stream.write_u64(body.len() as u64).await?;
        self.stream.write_all(header).await?;
        self.stream.write_all(body).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read one frame. Fails with `FramingError` if `headerLen` exceeds
    /// [`HEADER_LIMIT`], if `bodyLen` is negative when read as signed, or
    /// if the stream returns EOF/short-read before the declared bytes
    /// arrive.
    pub async fn recv(&mut self) -> Result<Message, DmpError> {
        let header_len = self.stream.read_u64().await?;
        let body_len_raw = self.stream.read_u64().await?;
        let body_len_signed = body_len_raw as i64;

        if header_len as usize > HEADER_LIMIT {
            return Err(DmpError::FramingError {
                expected: HEADER_LIMIT as i64,
                actual: header_len as i64,
            });
        }

        if body_len_signed < 0 {
            return Err(DmpError::MessageTooLong {
                expected: 0,
                actual: body_len_signed,
            });
        }

        let mut header = vec![0u8; header_len as usize];
        if header_len > 0 {
            self.stream.read_exact(&mut header).await?;
        }

        let mut body = vec![0u8; body_len_raw as usize];
        if body_len_raw > 0 {
            self.stream.read_exact(&mut body).await?;
        }

        Ok(Message::new(header, body))
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> FramedPipe<S>
where
    S: AsyncWrite + Unpin,
{
    /// Shut down the write half; dropping the pipe closes the read half.
    pub async fn close(&mut self) -> Result<(), DmpError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
