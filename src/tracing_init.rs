//! Tracing initialization for tests and binaries
//!
//! Both entry points honour `RUST_LOG`, e.g.:
//! - `RUST_LOG=rustylink=debug` - per-stage link output
//! - `RUST_LOG=rustylink::ldpc=trace` - belief-propagation iterations
//! - `RUST_LOG=rustylink=info,rustylink::polar=trace` - mixed levels

#[cfg(test)]
use once_cell::sync::Lazy;

/// Initialize tracing once for the test binary, defaulting to `rustylink=warn`
#[cfg(test)]
pub fn init_test_tracing() {
    static TRACING: Lazy<()> = Lazy::new(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("rustylink=warn"));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(true)
            .with_test_writer()
            .init();
    });

    Lazy::force(&TRACING);
}

/// Initialize tracing for binaries, defaulting to `rustylink=info`
///
/// Call early in `main()`. Worker threads of sweeps show up by id.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rustylink=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}
