//! Per-connection worker.
//!
//! Each accepted socket gets a reader loop that decodes one JSON message per
//! line and calls into the [`Session`], plus a writer task draining the
//! connection's outbound queue.
//!
//! Lines are read as raw bytes. A line that is not UTF-8, not JSON, or longer
//! than [`MAX_LINE_BYTES`] is dropped and the connection stays open.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{Outbound, ParticipantId, Session};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Longest accepted line, newline excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Outcome of reading one newline-terminated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// A complete line is in the buffer.
    Line,
    /// A line over the cap was read and discarded.
    Oversized,
    /// The peer closed its side.
    Closed,
}

/// Serves one client until it disconnects or the session shuts down.
#[instrument(skip(session, stream))]
pub async fn serve_connection(session: Arc<Session>, stream: TcpStream, peer: SocketAddr) {
    // Subscribe before attaching so a concurrent shutdown is never missed.
    let mut shutdown = session.subscribe_shutdown();

    let (reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();
    let id = match session.attach(tx.clone()) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Refusing connection");
            return;
        }
    };
    info!(%id, "Connection attached");

    let writer_task = tokio::spawn(write_loop(id, writer, rx));
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    if !*shutdown.borrow_and_update() {
        loop {
            tokio::select! {
                frame = read_frame(&mut reader, &mut buf) => match frame {
                    Ok(Frame::Line) => handle_line(&session, id, &tx, &buf),
                    Ok(Frame::Oversized) => {
                        debug!(%id, limit = MAX_LINE_BYTES, "Dropping oversized line");
                    }
                    Ok(Frame::Closed) => {
                        info!(%id, "Peer closed connection");
                        break;
                    }
                    Err(e) => {
                        info!(%id, error = %e, "Read failed, dropping connection");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    debug!(%id, "Session shut down, closing connection");
                    break;
                }
            }
        }
    }

    session.remove(id);
    drop(tx);
    if let Err(e) = writer_task.await {
        warn!(%id, error = %e, "Writer task failed");
    }
    info!(%id, "Connection closed");
}

/// Reads the next line into `buf`, without the trailing newline.
///
/// A final line with no newline before EOF still counts as a line. Lines
/// longer than [`MAX_LINE_BYTES`] are consumed up to their newline and
/// reported as [`Frame::Oversized`].
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let limit = MAX_LINE_BYTES as u64 + 1;
    buf.clear();
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(Frame::Closed);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        return Ok(Frame::Line);
    }
    if buf.len() <= MAX_LINE_BYTES {
        return Ok(Frame::Line);
    }

    loop {
        buf.clear();
        let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
        if read == 0 || buf.last() == Some(&b'\n') {
            buf.clear();
            return Ok(Frame::Oversized);
        }
    }
}

/// Decodes one line and dispatches it. Undecodable lines are dropped.
fn handle_line(session: &Session, id: ParticipantId, outbound: &Outbound, line: &[u8]) {
    let line = line.trim_ascii();
    if line.is_empty() {
        return;
    }

    let message = match serde_json::from_slice::<ClientMessage>(line) {
        Ok(message) => message,
        Err(e) => {
            debug!(%id, error = %e, "Dropping malformed message");
            return;
        }
    };

    let result = match message {
        ClientMessage::Introduce { name } => session.join(id, &name).map(|_| ()),
        ClientMessage::Move { big, small } => session.apply_move(id, big, small).map(|_| ()),
        ClientMessage::Shutdown => session.shutdown(id),
    };

    if let Err(e) = result {
        debug!(%id, error = %e, "Request rejected");
        let _ = outbound.send(ServerMessage::error(e.to_string()));
    }
}

/// Writes queued messages as JSON lines until the queue closes.
async fn write_loop(
    id: ParticipantId,
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(message) = outbound.recv().await {
        let mut line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(e) => {
                warn!(%id, error = %e, "Failed to encode message");
                continue;
            }
        };
        line.push('\n');

        if let Err(e) = writer.write_all(line.as_bytes()).await {
            debug!(%id, error = %e, "Write failed, stopping writer");
            return;
        }
    }

    let _ = writer.shutdown().await;
}
