use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Initialise diagnostics on stderr. `RUST_LOG` directives are honoured;
/// the floor is WARN, or INFO with `verbose`.
pub fn init(verbose: bool) {
    let level = if verbose { Level::INFO } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init();
}
