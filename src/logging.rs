use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
pub(crate) const LOG_ENV: &str = "VEGOPS_LOG";

/// Initialize stderr logging. `VEGOPS_LOG` wins over `default_level`.
pub(crate) fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
