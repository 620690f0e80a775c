/// Installs the global subscriber.
///
/// ```bash
/// RUST_LOG=debug order_orchestrator user     # Show debug logs
/// RUST_LOG=order_orchestrator::orchestrator=debug,info order_orchestrator order
/// ```
///
/// Defaults to `info` when `RUST_LOG` is unset.
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
