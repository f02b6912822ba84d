//! Tracing subscriber setup.

use anyhow::Context;
use tracing_subscriber::{
    filter::Directive, fmt, fmt::format::FmtSpan, layer::SubscriberExt,
    util::SubscriberInitExt, EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// sqlx logs every statement at `info`.
const QUIET_DIRECTIVES: &[&str] = &["sqlx::query=warn"];

/// Filter built from `logging.level` alone.
fn level_filter(level: &str) -> anyhow::Result<EnvFilter> {
    let mut filter =
        EnvFilter::try_new(level).with_context(|| format!("invalid logging.level {:?}", level))?;
    for directive in QUIET_DIRECTIVES {
        filter = filter.add_directive(directive.parse::<Directive>()?);
    }
    Ok(filter)
}

/// Installs the global subscriber. `RUST_LOG`, when set, replaces `logging.level`.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true),
            )
            .try_init(),
    }
    .context("a global tracing subscriber is already installed")
}
