use std::env;
use tracing_subscriber::EnvFilter;

pub fn init_logging(level_override: Option<&str>) {
    let level = level_override
        .map(str::to_string)
        .or_else(|| env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| "INFO".to_string())
        .to_lowercase();

    let filter = match env::var("RUST_LOG") {
        Ok(rust_log) if level_override.is_none() => EnvFilter::new(rust_log),
        _ => EnvFilter::new(level),
    };

    // stderr keeps rendered views on stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
