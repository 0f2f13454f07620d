use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::path::Path;
use tokio::net::UnixStream;
use tokio_util::codec::{Framed, LinesCodec};

use gossi_shared::*;

pub struct SocketClient {
    framed: Framed<UnixStream, LinesCodec>,
}

impl SocketClient {
    pub async fn connect() -> Result<Self> {
        Self::connect_to(SOCKET_PATH).await
    }

    pub async fn connect_to(path: impl AsRef<Path>) -> Result<Self> {
        let stream = UnixStream::connect(path.as_ref())
            .await
            .context("Failed to connect to server. Is gossi-core running?")?;
        let framed = Framed::new(stream, LinesCodec::new());
        Ok(Self { framed })
    }

    /// Sends one raw line and returns the raw reply.
    pub async fn send_line(&mut self, line: String) -> Result<Response> {
        self.framed.send(line).await?;
        let line = self.framed.next().await.context("Connection closed")??;
        let response: Response = serde_json::from_str(&line)?;
        Ok(response)
    }

    async fn send_command(&mut self, command: Command) -> Result<Response> {
        let json = serde_json::to_string(&command)?;
        self.send_line(json).await
    }

    pub async fn run(
        &mut self,
        program: String,
        data: String,
        config: Option<ExecutionConfig>,
    ) -> Result<RunResult> {
        let command = Command::Run(RunRequest {
            program,
            data,
            config,
        });
        let response = self.send_command(command).await?;
        match response {
            Response::Run(Ok(resp)) => Ok(resp),
            Response::Run(Err(e)) => Err(anyhow::anyhow!(e)),
            Response::Error { message } => Err(anyhow::anyhow!(message)),
            _ => Err(anyhow::anyhow!("Unexpected response type")),
        }
    }

    pub async fn describe(&mut self) -> Result<DescribeResponse> {
        let response = self.send_command(Command::Describe).await?;
        match response {
            Response::Describe(Ok(resp)) => Ok(resp),
            Response::Describe(Err(e)) => Err(anyhow::anyhow!(e)),
            Response::Error { message } => Err(anyhow::anyhow!(message)),
            _ => Err(anyhow::anyhow!("Unexpected response type")),
        }
    }
}
