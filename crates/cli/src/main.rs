use clap::{Parser, Subcommand};

mod commands;
use commands::{
    handle_config_command, handle_probe_command, utils::print_error, ConfigCommands, ProbeOptions,
};

#[derive(Parser)]
#[command(name = "citadel-cli")]
#[command(about = "Citadel CLI - configuration and upstream diagnostics for the Citadel RPC proxy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Time a JSON-RPC call against every configured upstream
    Probe {
        /// Path to config file
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,

        /// JSON-RPC method to send (with empty params)
        #[arg(short, long, default_value = "eth_blockNumber")]
        method: String,

        /// Per-endpoint deadline in milliseconds (defaults to race.request_timeout_ms)
        #[arg(short, long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config(config_command) => handle_config_command(config_command),
        Commands::Probe { file, method, timeout_ms } => {
            handle_probe_command(ProbeOptions { file, method, timeout_ms }).await
        }
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
