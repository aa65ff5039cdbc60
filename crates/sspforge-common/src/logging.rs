//! ---
//! ssp_section: "01-foundation"
//! ssp_subsection: "logging"
//! ssp_type: "module"
//! ssp_scope: "runtime"
//! ssp_description: "Tracing subscriber setup for command-line surfaces."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_ENV: &str = "SSPFORGE_LOG";

/// Initialize the tracing subscriber for a command-line invocation.
///
/// * `SSPFORGE_LOG` can be set to override the log filter (e.g. `info`,
///   `debug,sspforge_xml=trace`). When unset the standard `RUST_LOG`
///   variable is honoured, finally defaulting to `info`, or `debug` when
///   `verbose` is requested.
/// * Events go to stderr so that command output on stdout stays clean for
///   piping.
///
/// Repeated calls are harmless; only the first subscriber wins.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };

    // Honour the custom `SSPFORGE_LOG` directive first, then the standard
    // `RUST_LOG` variable, then the built-in default.
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!(
                "invalid {} directive ({}); defaulting to {} logging",
                LOG_ENV, err, default_directive
            );
            EnvFilter::new(default_directive)
        }),
        Err(_) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive)),
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .ok();
}
