//! Newline-delimited JSON over TCP.
//!
//! The keyboard only needs ordered best-effort delivery per connection, so
//! one line is one message in both directions.

use std::{
    io::{BufRead, BufReader, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    thread,
};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{error::TransportError, io::OutboundMessage};

/// Outbound half of a connection to the relay.
pub trait Transport {
    fn send(&mut self, message: &OutboundMessage) -> Result<(), TransportError>;

    fn close(&mut self);

    fn is_open(&self) -> bool;
}

pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Connect and spawn a reader thread. Received lines arrive on the
    /// returned consumer; it reports `is_abandoned()` once the connection
    /// is gone.
    pub fn connect(
        addr: impl ToSocketAddrs,
        inbound_capacity: usize,
    ) -> Result<(Self, Consumer<String>), TransportError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let reader = stream.try_clone()?;
        tracing::info!(peer = ?stream.peer_addr().ok(), "connected to relay");

        let (tx, rx) = RingBuffer::new(inbound_capacity);
        thread::Builder::new()
            .name("keyjam-net".into())
            .spawn(move || read_lines(reader, tx))?;

        Ok((
            Self {
                stream: Some(stream),
            },
            rx,
        ))
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, message: &OutboundMessage) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::Closed)?;
        let mut line = message.to_json()?;
        line.push('\n');
        stream.write_all(line.as_bytes())?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // Also wakes the reader thread.
            let _ = stream.shutdown(Shutdown::Both);
            tracing::info!("disconnected from relay");
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_lines(stream: TcpStream, mut tx: Producer<String>) {
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => {
                if tx.push(line).is_err() {
                    tracing::warn!("inbound queue full, dropping message");
                }
            }
            Err(err) => {
                tracing::warn!("relay connection error: {err}");
                break;
            }
        }
    }
    tracing::info!("relay closed the connection");
}
