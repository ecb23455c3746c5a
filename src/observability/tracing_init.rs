//! Tracing initialization with configurable logging formats.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level; extra filter
/// directives from the config are appended either way.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = build_env_filter(config);

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Compact => {
            let fmt_layer = tracing_subscriber::fmt::layer().compact().with_target(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
    }
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    let mut directives = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) => env,
        Err(_) => config.level.as_str().to_string(),
    };

    if let Some(extra) = &config.filter {
        directives.push(',');
        directives.push_str(extra);
    }

    EnvFilter::try_new(&directives).unwrap_or_else(|_| {
        eprintln!("Invalid log filter {directives:?}, falling back to info");
        EnvFilter::new("info")
    })
}
