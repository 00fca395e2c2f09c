use tracing_subscriber::EnvFilter;

/// Default directives when `RUST_LOG` is unset or unparseable.
const DEFAULT_FILTER: &str = "warn,efficiency_service=info,efficiency_core=info";

/// Installs the global fmt subscriber. `RUST_LOG` overrides the defaults.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
