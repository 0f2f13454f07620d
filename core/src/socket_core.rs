use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use gossi_shared::{Command, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::codec::{Framed, LinesCodec};

use crate::server::Server;

pub struct SocketServer {
    server: Arc<Server>,
    path: PathBuf,
}

impl SocketServer {
    pub fn new(server: Server, path: impl Into<PathBuf>) -> Self {
        Self {
            server: Arc::new(server),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bind(&self) -> Result<UnixListener> {
        let _ = std::fs::remove_file(&self.path);
        let listener = UnixListener::bind(&self.path).context("Failed to bind Unix socket")?;
        tracing::info!("Socket server listening on {}", self.path.display());
        Ok(listener)
    }

    /// Serves connections until the process is torn down.
    pub async fn listen(&self) -> Result<()> {
        let listener = self.bind()?;
        self.serve(listener).await
    }

    pub async fn serve(&self, listener: UnixListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let server = Arc::clone(&self.server);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, server).await {
                            tracing::error!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, server: Arc<Server>) -> Result<()> {
    let mut framed = Framed::new(stream, LinesCodec::new());
    while let Some(line) = framed.next().await {
        let line = line.context("Failed to read line")?;
        let command: Command = match serde_json::from_str(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                tracing::warn!("Rejected malformed command: {}", e);
                let response = Response::Error {
                    message: format!("Invalid command: {}", e),
                };
                let json = serde_json::to_string(&response)?;
                framed.send(json).await?;
                continue;
            }
        };
        let response = process_command(command, &server).await;
        let json = serde_json::to_string(&response)?;
        framed.send(json).await?;
    }
    Ok(())
}

async fn process_command(command: Command, server: &Server) -> Response {
    match command {
        Command::Run(req) => {
            let result = server.run(req).await.map_err(|e| format!("{:#}", e));
            Response::Run(result)
        }
        Command::Describe => {
            let result = server.describe().await.map_err(|e| e.to_string());
            Response::Describe(result)
        }
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
