use std::path::PathBuf;
use std::time::Duration;

use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::messages::{BarCommand, BarEvent, IpcRequest};

/// Longest command line read from a client
const MAX_LINE: u64 = 4096;

/// Control socket accepting one command line per connection
pub struct IpcServer {
    path: PathBuf,
    event_tx: Sender<BarEvent>,
}

impl IpcServer {
    pub fn new(path: PathBuf, event_tx: Sender<BarEvent>) -> Self {
        Self { path, event_tx }
    }

    /// Serve connections until the runtime shuts down
    pub async fn run(self) -> anyhow::Result<()> {
        // A previous instance may have left its socket behind
        if self.path.exists() {
            debug!("Removing stale socket {:?}", self.path);
            tokio::fs::remove_file(&self.path).await?;
        }

        let listener = UnixListener::bind(&self.path)?;
        info!("Listening on {:?}", self.path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let event_tx = self.event_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, event_tx).await {
                            debug!("IPC client error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept IPC connection: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

async fn handle_client(stream: UnixStream, event_tx: Sender<BarEvent>) -> anyhow::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut line = String::new();
    BufReader::new(read.take(MAX_LINE)).read_line(&mut line).await?;

    let response = match BarCommand::parse(&line) {
        Some(command) => {
            debug!("IPC command: {}", command);
            let (reply, answer) = oneshot::channel();
            event_tx
                .send(BarEvent::Request(IpcRequest { command, reply }))
                .await?;
            answer
                .await
                .unwrap_or_else(|_| "error: no answer from the bar".to_string())
        }
        None => {
            warn!("Unknown IPC command: {:?}", line.trim());
            format!("error: unknown command {:?}", line.trim())
        }
    };

    write.write_all(response.as_bytes()).await?;
    write.write_all(b"\n").await?;
    write.shutdown().await?;
    Ok(())
}
