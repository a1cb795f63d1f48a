use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber with `filter` (e.g. `"taskmate=info"`).
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {:?}: {}", filter, e);
        EnvFilter::new(crate::config::DEFAULT_LOG_FILTER)
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
