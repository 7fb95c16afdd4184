use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::prelude::*;

use crate::shared::config::LoggingConfig;
use tracing::info;

/// Prefix of every target the decoder logs under.
pub const TARGET_PREFIX: &str = "mlt_decoder";

/// Builds a sink filter from a base level plus the configured per-target
/// directives.
pub fn sink_filter(level: &str, targets: Option<&str>) -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::builder().parse(level)?;
    for directive in targets
        .into_iter()
        .flat_map(|t| t.split(','))
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

fn span_events(cfg: &LoggingConfig) -> FmtSpan {
    if cfg.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

pub fn init(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let targets = cfg.targets.as_deref();

    let stdout_layer = fmt::layer()
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_span_events(span_events(cfg))
        .with_filter(sink_filter(&cfg.stdout_level, targets)?);

    let file_appender = tracing_appender::rolling::daily(&cfg.log_dir, "mlt_decoder.log");
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_span_events(span_events(cfg))
        .with_filter(sink_filter(&cfg.file_level, targets)?);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    info!(
        target: "mlt_decoder::logging",
        stdout_level = %cfg.stdout_level,
        file_level = %cfg.file_level,
        targets = targets.unwrap_or(""),
        span_timings = cfg.span_timings,
        "Logging initialized"
    );
    Ok(())
}

/// Debug output of decoder targets with span timings, captured per test.
#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive(format!("{}=debug", TARGET_PREFIX).parse().unwrap());

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .try_init();
    });
}
