// service/src/telemetry.rs

use crate::config::LogFormat;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing(format: LogFormat) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration

  let result = match format {
    LogFormat::Text => builder.try_init(),
    LogFormat::Json => builder.json().try_init(),
  };

  if let Err(e) = result {
    eprintln!("tracing subscriber already installed: {e}");
  }
}

/// Reads `LOG_FORMAT` before the full config is loaded, so config errors get logged
/// in the requested format. Unknown values fall back to text.
pub fn log_format_from_env() -> LogFormat {
  std::env::var("LOG_FORMAT")
    .ok()
    .and_then(|raw| raw.parse().ok())
    .unwrap_or(LogFormat::Text)
}
