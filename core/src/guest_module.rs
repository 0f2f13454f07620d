use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wasmtime::{Engine, Module};

#[derive(Debug, Clone)]
pub struct GuestMetadata {
    pub path: PathBuf,
    pub size: usize,
}

/// The compiled gossi guest, shared read-only by every call.
#[derive(Clone)]
pub struct GuestModule {
    pub metadata: GuestMetadata,
    pub module: Module,
    engine: Engine,
}

impl GuestModule {
    pub async fn load(engine: Engine, path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = path.as_ref();
        tracing::info!("Loading guest module from: {}", path.display());
        let wasm_bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read WASM file: {}", path.display()))?;
        let guest = Self::from_bytes(engine, &wasm_bytes, path)?;
        tracing::info!(
            "Guest module loaded: {} (size: {} bytes)",
            path.display(),
            guest.metadata.size
        );
        Ok(Arc::new(guest))
    }

    /// Compiles a guest from raw bytes. Accepts the text format as well.
    pub fn from_bytes(engine: Engine, bytes: &[u8], path: impl Into<PathBuf>) -> Result<Self> {
        let module = Module::new(&engine, bytes).context("Failed to compile WASM module")?;
        Ok(Self {
            metadata: GuestMetadata {
                path: path.into(),
                size: bytes.len(),
            },
            module,
            engine,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}
