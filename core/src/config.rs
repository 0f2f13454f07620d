use clap::Parser;
use gossi_shared::SOCKET_PATH;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gossi-core")]
#[command(about = "Keeps the gossi dispatcher resident and serves it over a Unix socket", long_about = None)]
pub struct HostArgs {
    /// Socket to listen on
    #[arg(short, long, default_value = SOCKET_PATH)]
    pub socket: PathBuf,

    /// Compiled gossi guest
    #[arg(short, long, default_value = "./plugins/gossi.wasm")]
    pub module: PathBuf,

    /// Answer calls in-process instead of through the guest
    #[arg(long)]
    pub native: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl HostArgs {
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
