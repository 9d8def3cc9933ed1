//! Tracing setup for hosts embedding `tschart`.
//!
//! The chart and table code only emit `tracing` events. Installing a
//! subscriber is left to the host; `init_default_tracing` is a convenience
//! for demos and tests that want readable output with one call.

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "tschart=info";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG` (falling back to
/// [`DEFAULT_FILTER`]).
///
/// Returns `false` when the `telemetry` feature is disabled or the host has
/// already installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_filter(DEFAULT_FILTER)
}

/// Same as [`init_default_tracing`] with an explicit fallback filter directive.
#[must_use]
pub fn init_tracing_with_filter(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}
