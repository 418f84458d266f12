use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const CONTENT_FETCH_TOTAL: &str = "inkpress_content_fetch_total";
pub const CONTENT_FETCH_ERROR_TOTAL: &str = "inkpress_content_fetch_error_total";
pub const CONTENT_FETCH_MS: &str = "inkpress_content_fetch_ms";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            CONTENT_FETCH_TOTAL,
            Unit::Count,
            "Total number of queries sent to the content source, labelled by query."
        );
        describe_counter!(
            CONTENT_FETCH_ERROR_TOTAL,
            Unit::Count,
            "Total number of content source queries that failed, labelled by query and kind."
        );
        describe_histogram!(
            CONTENT_FETCH_MS,
            Unit::Milliseconds,
            "Content source query latency in milliseconds."
        );
    });
}
