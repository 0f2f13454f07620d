use anyhow::{anyhow, Context, Result};
use gossi_shared::plugin_helpers::{
    status_message, EXPORT_INPUT_CAPACITY, EXPORT_INPUT_PTR, EXPORT_MEMORY, EXPORT_RUN, HOST_EMIT,
    HOST_LOG, HOST_MODULE, SUCCESS,
};
use gossi_shared::{ExecutionConfig, RunResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use wasmtime::*;

use crate::guest_module::GuestModule;

/// Calls the gossi guest. Every call gets its own `Store`.
pub struct Executor {
    guest: Arc<GuestModule>,
}

impl Executor {
    pub fn new(guest: Arc<GuestModule>) -> Self {
        Self { guest }
    }

    pub fn guest(&self) -> &GuestModule {
        &self.guest
    }

    pub async fn execute(
        &self,
        program: &str,
        data: &str,
        config: ExecutionConfig,
    ) -> Result<RunResult> {
        let start = std::time::Instant::now();
        tracing::info!("Executing guest: program={:?}, {} bytes", program, data.len());
        let result = timeout(
            Duration::from_millis(config.timeout_ms),
            self.execute_guest(program, data, &config),
        )
        .await
        .context("Execution timeout")??;
        let execution_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Execution completed ({}ms, fuel: {})",
            execution_time_ms,
            result.fuel_consumed
        );
        Ok(RunResult {
            execution_time_ms,
            ..result
        })
    }

    async fn execute_guest(
        &self,
        program: &str,
        data: &str,
        config: &ExecutionConfig,
    ) -> Result<RunResult> {
        let engine = self.guest.engine();
        let mut store = Store::new(engine, HostState::new());
        let fuel_limit = config.timeout_ms.saturating_mul(1_000_000);
        store.set_fuel(fuel_limit)?;
        let mut linker = Linker::new(engine);
        linker.func_wrap_async(
            HOST_MODULE,
            HOST_LOG,
            |mut caller: Caller<'_, HostState>, (ptr, len): (i32, i32)| {
                Box::new(async move {
                    let message = read_guest_str(&mut caller, ptr, len)?;
                    tracing::debug!("[Plugin Log]: {}", message);
                    Ok(())
                })
            },
        )?;
        linker.func_wrap_async(
            HOST_MODULE,
            HOST_EMIT,
            |mut caller: Caller<'_, HostState>, (ptr, len): (i32, i32)| {
                Box::new(async move {
                    let chunk = read_guest_str(&mut caller, ptr, len)?;
                    caller.data_mut().output.push_str(&chunk);
                    Ok(())
                })
            },
        )?;

        let instance = linker
            .instantiate_async(&mut store, &self.guest.module)
            .await
            .map_err(|e| {
                tracing::error!("Instantiation error: {:?}", e);
                anyhow!("Failed to instantiate module: {}. Check that all required imports are satisfied.", e)
            })?;
        let memory = instance
            .get_memory(&mut store, EXPORT_MEMORY)
            .ok_or_else(|| anyhow!("Guest must export 'memory'"))?;
        let memory_size_mb = (memory.size(&store) * 64 * 1024) / (1024 * 1024);
        if memory_size_mb > config.memory_limit_mb {
            return Err(anyhow!(
                "Memory limit exceeded: {} MB > {} MB",
                memory_size_mb,
                config.memory_limit_mb
            ));
        }

        let input_ptr = instance
            .get_typed_func::<(), i32>(&mut store, EXPORT_INPUT_PTR)
            .context("Guest must export 'input_ptr() -> i32'")?
            .call_async(&mut store, ())
            .await?;
        let input_capacity = instance
            .get_typed_func::<(), i32>(&mut store, EXPORT_INPUT_CAPACITY)
            .context("Guest must export 'input_capacity() -> i32'")?
            .call_async(&mut store, ())
            .await?;
        let input_len = program.len() + data.len();
        if input_len > input_capacity as usize {
            return Err(anyhow!(
                "Input too large: {} bytes > {} byte guest buffer",
                input_len,
                input_capacity
            ));
        }

        let program_ptr = input_ptr as usize;
        let data_ptr = program_ptr + program.len();
        memory
            .write(&mut store, program_ptr, program.as_bytes())
            .context("Failed to write program to memory")?;
        memory
            .write(&mut store, data_ptr, data.as_bytes())
            .context("Failed to write data to memory")?;

        let run_func = instance
            .get_typed_func::<(i32, i32, i32, i32), i32>(&mut store, EXPORT_RUN)
            .context("Guest must export 'run(i32, i32, i32, i32) -> i32'")?;
        let return_code = run_func
            .call_async(
                &mut store,
                (
                    program_ptr as i32,
                    program.len() as i32,
                    data_ptr as i32,
                    data.len() as i32,
                ),
            )
            .await
            .context("Guest execution failed")?;
        if return_code != SUCCESS {
            return Err(anyhow!(
                "Guest returned {} ({})",
                return_code,
                status_message(return_code)
            ));
        }
        let fuel_consumed = fuel_limit.saturating_sub(store.get_fuel().unwrap_or(0));
        let output = std::mem::take(&mut store.data_mut().output);
        Ok(RunResult {
            output,
            return_code,
            execution_time_ms: 0, // Will be set by caller
            fuel_consumed,
        })
    }
}

fn read_guest_str(caller: &mut Caller<'_, HostState>, ptr: i32, len: i32) -> Result<String> {
    let mem = caller
        .get_export(EXPORT_MEMORY)
        .and_then(|e| e.into_memory())
        .ok_or_else(|| anyhow!("No memory export"))?;
    let len = usize::try_from(len).context("Negative length from guest")?;
    let mut buf = vec![0u8; len];
    mem.read(&*caller, ptr as u32 as usize, &mut buf)?;
    String::from_utf8(buf).context("Invalid UTF-8")
}

#[derive(Default)]
struct HostState {
    output: String,
}

impl HostState {
    fn new() -> Self {
        Self::default()
    }
}
