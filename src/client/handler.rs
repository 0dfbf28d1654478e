use futures::StreamExt;
use log::{error, info, warn};
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::codec::FramedRead;

use crate::client::{ConnectionId, Outbound};
use crate::protocol::codec::{ChatCodec, ChatFrame};
use crate::protocol::{CommandStatus, responses};
use crate::server::Lifecycle;

/// Handles one admitted chat connection using Tokio async runtime.
///
/// The connection is already in the registry under `id`; `outbound` is the
/// receiving half of the queue its `ClientHandle` sends into.
///
/// - Frames newline-delimited command lines and hands them to the lifecycle.
/// - Drains the connection's outbound queue onto the socket.
/// - Whatever ends the session (quit, EOF, I/O error, server stop), the
///   connection leaves the registry through a single `on_disconnect` call.
pub async fn handle_connection(
    stream: TcpStream,
    client_addr: SocketAddr,
    id: ConnectionId,
    mut outbound: UnboundedReceiver<Outbound>,
    lifecycle: Lifecycle,
    max_line_length: usize,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut frames = FramedRead::new(read_half, ChatCodec::new(max_line_length));

    loop {
        tokio::select! {
            item = outbound.recv() => match item {
                Some(Outbound::Line(text)) => {
                    if let Err(e) = write_line(&mut write_half, &text).await {
                        warn!("Failed to write to {}: {}", client_addr, e);
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    info!("Closing connection {} ({})", id, client_addr);
                    break;
                }
            },
            frame = frames.next() => match frame {
                Some(Ok(ChatFrame::Line(line))) => {
                    if lifecycle.on_message(id, &line).await == CommandStatus::CloseConnection {
                        break;
                    }
                }
                Some(Ok(ChatFrame::TooLong)) => {
                    if let Err(e) = write_line(&mut write_half, responses::COMMAND_TOO_LONG).await {
                        warn!("Failed to write to {}: {}", client_addr, e);
                        break;
                    }
                }
                None => {
                    // Client closed the connection
                    info!("Connection closed by client {}", client_addr);
                    break;
                }
                Some(Err(e)) => {
                    error!("Failed to read from {}: {}", client_addr, e);
                    break;
                }
            },
        }
    }

    lifecycle.on_disconnect(id).await;

    // Flush replies queued before the session ended
    while let Ok(Outbound::Line(text)) = outbound.try_recv() {
        if write_line(&mut write_half, &text).await.is_err() {
            break;
        }
    }
    let _ = write_half.shutdown().await;
}

async fn write_line(writer: &mut OwnedWriteHalf, text: &str) -> std::io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
