//! Tracing subscriber setup, with optional OpenTelemetry export.

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::{
	metrics::{
		reader::{DefaultAggregationSelector, DefaultTemporalitySelector},
		MeterProviderBuilder, PeriodicReader, SdkMeterProvider,
	},
	runtime,
	trace::{BatchConfig, Sampler, Tracer},
	Resource,
};
use opentelemetry_semantic_conventions::{
	resource::{DEPLOYMENT_ENVIRONMENT, SERVICE_NAME, SERVICE_VERSION},
	SCHEMA_URL,
};
use tracing::{level_filters::LevelFilter, Level};
use tracing_opentelemetry::MetricsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn environment() -> &'static str {
	if cfg!(debug_assertions) {
		"development"
	} else {
		"production"
	}
}

/// Describes the blog server to the collector.
fn resource() -> Resource {
	Resource::from_schema_url(
		[
			KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
			KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
			KeyValue::new(DEPLOYMENT_ENVIRONMENT, environment()),
		],
		SCHEMA_URL,
	)
}

fn init_meter_provider() -> SdkMeterProvider {
	let exporter = opentelemetry_otlp::new_exporter()
		.tonic()
		.build_metrics_exporter(
			Box::new(DefaultAggregationSelector::new()),
			Box::new(DefaultTemporalitySelector::new()),
		)
		.expect("failed to build the OTLP metrics exporter");

	let reader = PeriodicReader::builder(exporter, runtime::Tokio)
		.with_interval(std::time::Duration::from_secs(15))
		.build();

	let meter_provider = MeterProviderBuilder::default();

	// Mirror metrics to stdout while developing
	#[cfg(debug_assertions)]
	let meter_provider = meter_provider.with_reader(
		PeriodicReader::builder(
			opentelemetry_stdout::MetricsExporter::default(),
			runtime::Tokio,
		)
		.build(),
	);

	let meter_provider = meter_provider
		.with_resource(resource())
		.with_reader(reader)
		.build();

	global::set_meter_provider(meter_provider.clone());

	meter_provider
}

fn init_tracer() -> Tracer {
	opentelemetry_otlp::new_pipeline()
		.tracing()
		.with_trace_config(
			opentelemetry_sdk::trace::Config::default()
				.with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
					1.0,
				))))
				.with_resource(resource()),
		)
		.with_batch_config(BatchConfig::default())
		.with_exporter(opentelemetry_otlp::new_exporter().tonic())
		.install_batch(runtime::Tokio)
		.expect("failed to install the OTLP trace pipeline")
}

/// Initializes the global tracing subscriber.
///
/// Log lines always go to stdout. With `otlp` set, spans and metrics are also
/// exported to the collector named by `OTEL_EXPORTER_OTLP_ENDPOINT`, and the
/// returned guard flushes them when dropped.
pub fn init_tracing_subscriber(otlp: bool) -> Option<OtelGuard> {
	let registry = tracing_subscriber::registry()
		.with(LevelFilter::from_level(Level::INFO))
		.with(tracing_subscriber::fmt::layer().with_ansi(cfg!(debug_assertions)));

	if !otlp {
		registry.init();
		return None;
	}

	let meter_provider = init_meter_provider();

	registry
		.with(MetricsLayer::new(meter_provider.clone()))
		.with(tracing_opentelemetry::layer().with_tracer(init_tracer()))
		.init();

	Some(OtelGuard { meter_provider })
}

pub struct OtelGuard {
	meter_provider: SdkMeterProvider,
}

impl Drop for OtelGuard {
	fn drop(&mut self) {
		if let Err(err) = self.meter_provider.shutdown() {
			eprintln!("{err:?}");
		}

		global::shutdown_tracer_provider();
	}
}
