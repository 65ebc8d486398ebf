//! Logging and OpenTelemetry setup shared by the rowpost binaries.
//!
//! Logs are written to stdout, filtered by `RUST_LOG` (default `info`). The
//! format is selected with `RUST_LOG_FORMAT` (`compact` or `json`).
//!
//! Spans and metrics always flow through the OpenTelemetry SDK so that
//! instruments created with [`meter`] are live, but they are only exported over
//! OTLP when `OTEL_SDK_DISABLED=false`.

use std::{borrow::Cow, time::Duration};

use opentelemetry::{InstrumentationScope, global, trace::TracerProvider as _};
use opentelemetry_otlp::{ExporterBuildError, MetricExporter, SpanExporter};
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    trace::SdkTracerProvider,
};
use snafu::{ResultExt, Snafu};
use time::macros::format_description;
use tracing::Subscriber;
use tracing_opentelemetry::MetricsLayer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::time::UtcTime, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

pub use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram, Meter, UpDownCounter},
};

const OTEL_SDK_DISABLED: &str = "OTEL_SDK_DISABLED";
const RUST_LOG_FORMAT: &str = "RUST_LOG_FORMAT";
const METRICS_EXPORT_INTERVAL: Duration = Duration::from_secs(10);

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

#[derive(Debug, Snafu)]
pub enum ObservabilityError {
    #[snafu(display("Failed to build OTLP exporter"))]
    Exporter { source: ExporterBuildError },
    #[snafu(display("Failed to install tracing subscriber"))]
    Subscriber {
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Output format of the stdout log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Flushes and shuts down the OpenTelemetry providers when dropped.
///
/// Keep it alive for as long as the process should emit telemetry.
#[must_use = "telemetry stops when the guard is dropped"]
pub struct ObservabilityGuard {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

pub fn meter(name: &'static str) -> Meter {
    global::meter(name)
}

/// Install the global tracing subscriber and meter provider.
pub fn init_observability(
    package_name: impl Into<Cow<'static, str>>,
    package_version: impl Into<Cow<'static, str>>,
) -> Result<ObservabilityGuard, ObservabilityError> {
    let format = LogFormat::from_env_value(std::env::var(RUST_LOG_FORMAT).ok().as_deref());
    let export = export_enabled(std::env::var(OTEL_SDK_DISABLED).ok().as_deref());

    let scope = InstrumentationScope::builder(package_name.into())
        .with_version(package_version.into())
        .build();

    let tracer_provider = tracer_provider(export)?;
    let meter_provider = meter_provider(export)?;
    global::set_meter_provider(meter_provider.clone());

    let otel_layer = tracing_opentelemetry::layer()
        .with_tracer(tracer_provider.tracer_with_scope(scope))
        .and_then(MetricsLayer::new(meter_provider.clone()))
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(stdout_layer(format))
        .with(otel_layer)
        .try_init()
        .context(SubscriberSnafu {})?;

    Ok(ObservabilityGuard {
        tracer_provider,
        meter_provider,
    })
}

impl LogFormat {
    /// Parse the value of `RUST_LOG_FORMAT`. Unknown values fall back to compact.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// OTLP export is opt-in: it only runs when `OTEL_SDK_DISABLED` is exactly `false`.
fn export_enabled(sdk_disabled: Option<&str>) -> bool {
    sdk_disabled.is_some_and(|value| value.trim().eq_ignore_ascii_case("false"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn stdout_layer<S>(format: LogFormat) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer().with_target(false);

    match format {
        LogFormat::Compact => layer
            .compact()
            .with_timer(UtcTime::new(format_description!(
                "[hour]:[minute]:[second].[subsecond digits:3]"
            )))
            .with_filter(env_filter())
            .boxed(),
        LogFormat::Json => layer
            .json()
            .with_ansi(false)
            .with_current_span(false)
            .with_filter(env_filter())
            .boxed(),
    }
}

fn tracer_provider(export: bool) -> Result<SdkTracerProvider, ObservabilityError> {
    let builder = SdkTracerProvider::builder().with_resource(Resource::builder().build());

    if !export {
        return Ok(builder.build());
    }

    let exporter = SpanExporter::builder()
        .with_tonic()
        .build()
        .context(ExporterSnafu {})?;

    Ok(builder.with_batch_exporter(exporter).build())
}

fn meter_provider(export: bool) -> Result<SdkMeterProvider, ObservabilityError> {
    let builder = SdkMeterProvider::builder().with_resource(Resource::builder().build());

    if !export {
        return Ok(builder.build());
    }

    let exporter = MetricExporter::builder()
        .with_tonic()
        .build()
        .context(ExporterSnafu {})?;
    let reader = PeriodicReader::builder(exporter)
        .with_interval(METRICS_EXPORT_INTERVAL)
        .build();

    Ok(builder.with_reader(reader).build())
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        // Errors here only mean there was nothing left to flush.
        let _ = self.tracer_provider.shutdown();
        let _ = self.meter_provider.shutdown();
    }
}
