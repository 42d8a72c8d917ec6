//! Tracing bootstrap for the `clqy` binary.
//!
//! The CLI decides how chatty the process should be (`-v` flags, `--quiet`)
//! and whether spans leave the process; this module turns that decision into
//! an installed subscriber. Turn-lifecycle events (thread opened/renewed,
//! turn persisted, provider degradation) are emitted by the services and
//! flow through whatever is installed here.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use std::sync::OnceLock;

/// Held so the exporter can be flushed on shutdown.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Map CLI verbosity flags to the fallback filter directive.
///
/// An explicit `-v` is a stronger signal than `--quiet`, so quiet only
/// applies at verbosity zero.
pub fn filter_directive(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `directive` is the fallback level, normally from [`filter_directive`];
/// an explicit `RUST_LOG` overrides it. With `enable_otel` the fmt layer
/// gains span-close timing and spans are additionally bridged to an
/// OpenTelemetry stdout exporter. Pair with [`shutdown_tracing`] so
/// buffered spans flush on exit.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(directive: &str, enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let otel_layer = tracing_opentelemetry::layer().with_tracer(provider.tracer("colloquy"));

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .with(otel_layer)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()?;
    }

    Ok(())
}

/// Flush and shut down the OpenTelemetry pipeline. No-op when
/// [`init_tracing`] ran without OTel.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "tracer provider shutdown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_verbosity_is_info() {
        assert_eq!(filter_directive(0, false), "info");
    }

    #[test]
    fn test_quiet_drops_to_error() {
        assert_eq!(filter_directive(0, true), "error");
    }

    #[test]
    fn test_verbose_flags_escalate() {
        assert_eq!(filter_directive(1, false), "debug");
        assert_eq!(filter_directive(2, false), "trace");
        assert_eq!(filter_directive(7, false), "trace");
    }

    #[test]
    fn test_verbose_beats_quiet() {
        assert_eq!(filter_directive(1, true), "debug");
        assert_eq!(filter_directive(2, true), "trace");
    }
}
