use clap::Subcommand;
use citadel_core::config::AppConfig;
use std::path::Path;

use super::utils::{print_error, print_info, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to config file
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Show the effective configuration (file plus CITADEL__ overrides)
    Show {
        /// Path to config file
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output path for the config file
        #[arg(short, long, default_value = "config/config.toml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

pub const SAMPLE_CONFIG: &str = r#"# Citadel RPC proxy configuration
# Every value below is the compiled default. Override single values with
# CITADEL__SECTION__FIELD environment variables.

environment = "development"
branding = "Citadel Proxy Active"

[server]
bind_address = "127.0.0.1"
bind_port = 3030
max_concurrent_requests = 500
max_body_bytes = 1048576
rpc_path = "/api/rpc"

[race]
# Leading endpoints raced first; the full list is raced only if all of them fail.
fast_tier_size = 3
# Deadline for every single upstream attempt.
request_timeout_ms = 8000

[upstreams]
max_concurrent_requests = 1000
connect_timeout_ms = 5000

# Order is preference: put the most reliable nodes first.
[[upstreams.endpoints]]
url = "https://bsc-testnet.bnbchain.org"

[[upstreams.endpoints]]
url = "https://bsc-testnet.publicnode.com"

[[upstreams.endpoints]]
url = "https://data-seed-prebsc-1-s1.binance.org:8545"

[[upstreams.endpoints]]
url = "https://data-seed-prebsc-2-s1.binance.org:8545"

[[upstreams.endpoints]]
url = "https://data-seed-prebsc-1-s2.binance.org:8545"

[[upstreams.endpoints]]
url = "https://data-seed-prebsc-2-s3.binance.org:8545"

[[upstreams.endpoints]]
url = "https://bsc-testnet.drpc.org"

[logging]
level = "info"
format = "pretty"
"#;

pub fn handle_config_command(command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Validate { file } => validate_config(&file),
        ConfigCommands::Show { file } => show_config(&file),
        ConfigCommands::Generate { output, force } => generate_config(&output, force),
    }
}

/// Loads `file` with environment overrides applied.
pub fn load_config(file: &str) -> CliResult<AppConfig> {
    AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        print_error(&format!("Configuration file not found: {file}"));
        return Err(CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));
    let config = load_config(file)?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    let endpoints = config.endpoint_set();
    println!("Configuration Summary:");
    println!("  Server: {}:{}", config.server.bind_address, config.server.bind_port);
    println!(
        "  Upstreams: {} endpoints ({} in fast tier)",
        endpoints.len(),
        endpoints.fast_tier_size()
    );
    println!("  Attempt deadline: {}ms", config.race.request_timeout_ms);

    Ok(())
}

fn show_config(file: &str) -> CliResult<()> {
    let config = load_config(file)?;

    println!("Configuration from {file}:");
    println!("  Environment: {}", config.environment);
    println!("  Branding: {}", config.branding);

    println!("\n[Server]");
    println!("  Bind Address: {}", config.server.bind_address);
    println!("  Bind Port: {}", config.server.bind_port);
    println!("  Max Concurrent Requests: {}", config.server.max_concurrent_requests);
    println!("  Max Body Size: {} bytes", config.server.max_body_bytes);
    println!("  RPC Path: {}", config.server.rpc_path);

    println!("\n[Race]");
    println!("  Fast Tier Size: {}", config.race.fast_tier_size);
    println!("  Attempt Deadline: {}ms", config.race.request_timeout_ms);

    let endpoints = config.endpoint_set();
    println!("\n[Upstreams] ({} endpoints)", endpoints.len());
    println!("  Max Concurrent Requests: {}", config.upstreams.max_concurrent_requests);
    println!("  Connect Timeout: {}ms", config.upstreams.connect_timeout_ms);
    for (position, endpoint) in endpoints.full_tier().iter().enumerate() {
        let tier = if position < endpoints.fast_tier_size() { "fast" } else { "full" };
        println!("  {}. {} [{tier}] {}", position + 1, endpoint.name, endpoint.url);
    }

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}

fn generate_config(output: &str, force: bool) -> CliResult<()> {
    if Path::new(output).exists() && !force {
        return Err(CliError::Config(format!(
            "File {output} already exists. Use --force to overwrite."
        )));
    }

    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, SAMPLE_CONFIG)?;

    print_success(&format!("Sample configuration generated: {output}"));
    print_info("Reorder [[upstreams.endpoints]] so the most reliable nodes come first");

    Ok(())
}
