use anyhow::Result;
use clap::{Parser, Subcommand};
use gossi_shared::{ExecutionConfig, SOCKET_PATH};
use std::path::PathBuf;

use gossi_client::SocketClient;

#[derive(Parser)]
#[command(name = "gossi-client")]
#[command(about = "Client for the gossi core server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = SOCKET_PATH, global = true)]
    socket: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run {
        #[arg(short, long)]
        program: String,

        #[arg(short, long, default_value = "")]
        data: String,

        #[arg(short, long, default_value = "5000")]
        timeout: u64,

        #[arg(short, long, default_value = "64")]
        memory: u64,
    },

    Describe,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut client = SocketClient::connect_to(&cli.socket).await?;

    match cli.command {
        Commands::Run {
            program,
            data,
            timeout,
            memory,
        } => {
            let config = Some(ExecutionConfig {
                timeout_ms: timeout,
                memory_limit_mb: memory,
            });

            match client.run(program, data, config).await {
                Ok(result) => {
                    println!("{}", result.output);
                    eprintln!(
                        "Execution time: {}ms, fuel consumed: {}",
                        result.execution_time_ms, result.fuel_consumed
                    );
                }
                Err(e) => {
                    eprintln!("Run failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Describe => match client.describe().await {
            Ok(description) => {
                println!("Backend: {}", description.backend);
                println!("Programs: {}", description.programs.join(", "));
                println!("Sign: {:?}", description.sign);
            }
            Err(e) => {
                eprintln!("Describe failed: {}", e);
                std::process::exit(1);
            }
        },
    }
    Ok(())
}
