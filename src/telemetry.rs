use std::error::Error;

use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, fmt::format::FmtSpan, EnvFilter};

/// Installs the global JSON subscriber and routes `log` records (teloxide
/// logs through `log`) into it. `RUST_LOG` directives refine `level`.
pub fn init(level: Level) -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
