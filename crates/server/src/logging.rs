use citadel_core::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATES: [&str; 3] = ["citadel_core", "server", "citadel_cli"];

/// Filter directive applying `level` to this workspace's crates and `warn` to dependencies.
#[must_use]
pub fn default_directive(level: &str) -> String {
    std::iter::once("warn".to_string())
        .chain(CRATES.iter().map(|krate| format!("{krate}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(level) if level == "debug" || level == "trace" => {
            EnvFilter::new(default_directive(&level))
        }
        Ok(_) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level))),
        Err(_) => EnvFilter::new(default_directive(&config.level)),
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. A bare `debug` or `trace` is scoped
/// to this workspace so dependency internals stay quiet.
pub fn init_logging(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(build_filter(config));

    if config.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(false),
            )
            .init();
    }
}
