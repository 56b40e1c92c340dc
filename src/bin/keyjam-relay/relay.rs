//! Fan-out relay
//!
//! Every connection is one participant. A line received from one participant
//! gets the sender's id stamped on and is written to every other participant.
//! Nothing is interpreted beyond that, so clients can add message types
//! without touching the relay.

use std::{io, net::SocketAddr, sync::Arc};

use keyjam::{
    io::{wire::stamp_sender, InboundMessage},
    synth::ParticipantId,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{tcp::OwnedWriteHalf, TcpListener, TcpStream, ToSocketAddrs},
    sync::broadcast::{self, error::RecvError},
};

/// Events waiting to be fanned out; slow readers past this lag and lose some.
const FANOUT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct Relayed {
    from: ParticipantId,
    line: Arc<str>,
}

impl Relayed {
    fn new(from: &ParticipantId, line: String) -> Self {
        Self {
            from: from.clone(),
            line: line.into(),
        }
    }
}

pub struct Relay {
    listener: TcpListener,
    events: broadcast::Sender<Relayed>,
}

impl Relay {
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let (events, _) = broadcast::channel(FANOUT_CAPACITY);
        Ok(Self { listener, events })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept participants until the listener fails.
    pub async fn run(self) -> io::Result<()> {
        let mut next_id = 1u64;
        loop {
            let (socket, peer) = self.listener.accept().await?;
            let id = ParticipantId::new(format!("p{next_id}"));
            next_id += 1;

            tracing::info!(participant = %id, %peer, "participant joined");
            let rx = self.events.subscribe();
            tokio::spawn(participant(socket, id, self.events.clone(), rx));
        }
    }
}

async fn participant(
    socket: TcpStream,
    id: ParticipantId,
    events: broadcast::Sender<Relayed>,
    mut rx: broadcast::Receiver<Relayed>,
) {
    if let Err(err) = socket.set_nodelay(true) {
        tracing::debug!(participant = %id, "set_nodelay failed: {err}");
    }
    let (read, mut write) = socket.into_split();
    let mut lines = BufReader::new(read).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match stamp_sender(&line, &id) {
                    Ok(stamped) => {
                        tracing::debug!(participant = %id, "relaying {stamped}");
                        // No receivers just means nobody else is here.
                        let _ = events.send(Relayed::new(&id, stamped));
                    }
                    Err(err) => {
                        tracing::warn!(participant = %id, "dropping bad event ({err}): {line}");
                    }
                },
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(participant = %id, "read failed: {err}");
                    break;
                }
            },
            relayed = rx.recv() => match relayed {
                Ok(relayed) if relayed.from == id => {}
                Ok(relayed) => {
                    if let Err(err) = write_line(&mut write, &relayed.line).await {
                        tracing::warn!(participant = %id, "send failed: {err}");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(participant = %id, skipped, "lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    tracing::info!(participant = %id, "participant left");
    match (InboundMessage::ParticipantLeft { id: id.clone() }).to_json() {
        Ok(line) => {
            let _ = events.send(Relayed::new(&id, line));
        }
        Err(err) => tracing::error!("failed to encode departure: {err}"),
    }
}

async fn write_line(write: &mut OwnedWriteHalf, line: &str) -> io::Result<()> {
    write.write_all(line.as_bytes()).await?;
    write.write_all(b"\n").await
}
