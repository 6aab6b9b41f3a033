use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::engine::{
    METRIC_CACHE_CORRUPT, METRIC_CACHE_ERROR, METRIC_CACHE_HIT, METRIC_CACHE_MISS,
    METRIC_CACHE_SKIP_EMPTY,
};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Log output format for the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Install a global tracing subscriber. Level directives come from
/// `RUST_LOG`, defaulting to `info`.
pub fn init(format: LogFormat) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt_layer = match format {
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

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_CACHE_HIT,
            Unit::Count,
            "Total number of list cache hits."
        );
        describe_counter!(
            METRIC_CACHE_MISS,
            Unit::Count,
            "Total number of list cache misses."
        );
        describe_counter!(
            METRIC_CACHE_ERROR,
            Unit::Count,
            "Total number of swallowed cache read/write failures."
        );
        describe_counter!(
            METRIC_CACHE_CORRUPT,
            Unit::Count,
            "Total number of corrupt cache payloads treated as misses."
        );
        describe_counter!(
            METRIC_CACHE_SKIP_EMPTY,
            Unit::Count,
            "Total number of empty list results deliberately not cached."
        );
    });
}
