use tracing_subscriber::{EnvFilter, fmt};

/// Install the stderr log subscriber used by the `rbf` binary.
///
/// `RUST_LOG` overrides the default filter, which is `warn`, or `debug` for
/// this crate when `verbose` is set. Logs never go to stdout, which carries
/// program output.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,rewind_bf=debug,rbf=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    // A second init in the same process is a no-op.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
