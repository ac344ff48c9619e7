use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Used when `RUST_LOG` is unset or cannot be parsed.
pub const DEFAULT_FILTER: &str = "info,blog=debug";

fn filter() -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initializes the global tracing subscriber, returning a guard that flushes
/// exported spans when dropped.
///
/// With the `otel` feature, spans are also exported over OTLP. A collector
/// that cannot be reached is logged and otherwise ignored.
#[must_use]
pub fn init() -> Guard {
	#[cfg(feature = "otel")]
	let (exporter, error) = match otel::init_tracer() {
		Ok(tracer) => (
			Some(tracing_opentelemetry::layer().with_tracer(tracer)),
			None,
		),
		Err(error) => (None, Some(error)),
	};

	let registry = tracing_subscriber::registry()
		.with(filter())
		.with(tracing_subscriber::fmt::layer().with_ansi(true));

	#[cfg(feature = "otel")]
	let registry = registry.with(exporter);

	registry.init();

	#[cfg(feature = "otel")]
	if let Some(error) = error {
		tracing::warn!(%error, "failed to start the OTLP exporter");
	}

	Guard { _private: () }
}

pub struct Guard {
	_private: (),
}

impl Drop for Guard {
	fn drop(&mut self) {
		#[cfg(feature = "otel")]
		opentelemetry::global::shutdown_tracer_provider();
	}
}

#[cfg(feature = "otel")]
mod otel {
	use opentelemetry::{trace::TraceError, KeyValue};
	use opentelemetry_sdk::{
		runtime,
		trace::{BatchConfig, Sampler, Tracer},
		Resource,
	};
	use opentelemetry_semantic_conventions::{
		resource::{DEPLOYMENT_ENVIRONMENT, SERVICE_NAME, SERVICE_VERSION},
		SCHEMA_URL,
	};

	/// Constructs a [`Resource`] which describes the service.
	fn resource() -> Resource {
		Resource::from_schema_url(
			[
				KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
				KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
				KeyValue::new(
					DEPLOYMENT_ENVIRONMENT,
					if cfg!(debug_assertions) {
						"development"
					} else {
						"production"
					},
				),
			],
			SCHEMA_URL,
		)
	}

	pub fn init_tracer() -> Result<Tracer, TraceError> {
		opentelemetry_otlp::new_pipeline()
			.tracing()
			.with_trace_config(
				opentelemetry_sdk::trace::Config::default()
					.with_sampler(Sampler::AlwaysOn)
					.with_resource(resource()),
			)
			.with_batch_config(BatchConfig::default())
			.with_exporter(opentelemetry_otlp::new_exporter().tonic())
			.install_batch(runtime::Tokio)
	}
}
