use anyhow::Result;
use clap::Parser;
use wasmtime::{Config, Engine};

use gossi_core::{Backend, Executor, GuestModule, HostArgs, Server, SocketServer};

#[tokio::main]
async fn main() -> Result<()> {
    let args = HostArgs::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .init();

    tracing::info!("Starting gossi core");

    let backend = if args.native {
        tracing::info!("Using native dispatcher");
        Backend::Native
    } else {
        let mut config = Config::new();
        config.async_support(true);
        config.consume_fuel(true);
        let engine = Engine::new(&config)?;
        tracing::info!("Wasmtime engine initialized");

        let guest = GuestModule::load(engine, &args.module).await?;
        let executor = Executor::new(guest);
        tracing::info!(
            "Guest ready: {} ({} bytes)",
            executor.guest().metadata.path.display(),
            executor.guest().metadata.size
        );
        Backend::Wasm(executor)
    };

    let server = Server::new(backend);
    let socket_server = SocketServer::new(server, &args.socket);
    tracing::info!("Use gossi-client to call `run`");

    // Never returns under normal operation; the accept loop keeps `run` resident.
    socket_server.listen().await?;

    Ok(())
}
