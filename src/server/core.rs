use log::{error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::client::{ClientHandle, handle_connection};
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::protocol::responses;
use crate::server::Lifecycle;

/// How long stopped sessions get to flush the shutdown token
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct Server {
    listener: TcpListener,
    lifecycle: Lifecycle,
    config: ServerConfig,
}

impl Server {
    /// Binds the listener and starts the lifecycle with an empty registry.
    pub async fn bind(config: ServerConfig) -> Result<Self, ChatServerError> {
        let socket = config.socket_addr();
        let listener = TcpListener::bind(socket.as_str()).await.map_err(|e| {
            error!("Failed to bind to {}: {}", socket, e);
            e
        })?;
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            listener,
            lifecycle: Lifecycle::on_start(config.max_clients),
            config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves, then notifies every
    /// connection, clears the registry and waits for the sessions to end.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ChatServerError>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Starting RAX chat server on {} (max {} clients)",
            self.local_addr()?,
            self.config.max_clients
        );

        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let (tx, outbound) = mpsc::unbounded_channel();

                        // Admission happens here, before the session task exists,
                        // so a stop can never miss a connection
                        match self.lifecycle.on_connect(ClientHandle::new(tx), addr).await {
                            Some(id) => {
                                let lifecycle = self.lifecycle.clone();
                                let max_line_length = self.config.max_line_length;

                                // One task per connection so the accept loop never blocks
                                sessions.spawn(handle_connection(
                                    stream,
                                    addr,
                                    id,
                                    outbound,
                                    lifecycle,
                                    max_line_length,
                                ));
                            }
                            None => {
                                sessions.spawn(reject(stream, addr));
                            }
                        }
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                },
                Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = finished {
                        warn!("Connection task ended abnormally: {}", e);
                    }
                }
            }
        }

        self.lifecycle.on_stop().await;

        let drained = timeout(SHUTDOWN_GRACE, async {
            while let Some(finished) = sessions.join_next().await {
                if let Err(e) = finished {
                    warn!("Connection task ended abnormally: {}", e);
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                "{} connections still open after {:?}, aborting them",
                sessions.len(),
                SHUTDOWN_GRACE
            );
            sessions.shutdown().await;
        }

        Ok(())
    }
}

/// Turns away a connection that arrived while the server is full.
async fn reject(mut stream: TcpStream, addr: SocketAddr) {
    warn!("Rejecting {}: too many connections", addr);
    let message = format!("{}\n", responses::TOO_MANY_CONNECTIONS);
    if let Err(e) = stream.write_all(message.as_bytes()).await {
        warn!("Failed to notify {}: {}", addr, e);
    }
    let _ = stream.shutdown().await;
}
