use tracing_subscriber::EnvFilter;

/// Route library logs through the test harness once per test binary (`RUST_LOG` honoured).
#[ctor::ctor]
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
