use anyhow::Result;
use gossi_shared::*;

use crate::executor::Executor;

/// Where `run` requests are answered.
pub enum Backend {
    /// Calls the dispatcher in-process.
    Native,
    /// Calls the loaded gossi guest.
    Wasm(Executor),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Native => "native",
            Backend::Wasm(_) => "wasm",
        }
    }
}

pub struct Server {
    backend: Backend,
}

impl Server {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub async fn run(&self, req: RunRequest) -> Result<RunResult> {
        tracing::info!("Run: program={:?} via {}", req.program, self.backend.name());
        match &self.backend {
            Backend::Native => {
                let start = std::time::Instant::now();
                let output = gossi_shared::run(&req.program, &req.data);
                Ok(RunResult {
                    output,
                    return_code: plugin_helpers::SUCCESS,
                    execution_time_ms: start.elapsed().as_millis() as u64,
                    fuel_consumed: 0,
                })
            }
            Backend::Wasm(executor) => {
                let config = req.config.unwrap_or_default();
                executor.execute(&req.program, &req.data, config).await
            }
        }
    }

    pub async fn describe(&self) -> Result<DescribeResponse> {
        let programs = Program::KNOWN
            .iter()
            .filter_map(|program| program.name())
            .map(str::to_string)
            .collect();
        Ok(DescribeResponse {
            programs,
            sign: SIGN.to_string(),
            backend: self.backend.name().to_string(),
        })
    }
}
