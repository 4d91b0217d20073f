//! Tracing setup for the binaries.
//!
//! The filter comes from `JQ_SYNTH_LOG`, falling back to `RUST_LOG`, with
//! the usual directive syntax (`debug`, `jq_synth::search=trace`). Passing
//! `verbose` forces at least `debug` for this crate. With neither, no
//! subscriber is installed.
//!
//! Output goes to stderr so stdout only carries synthesized expressions.
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "JQ_SYNTH_LOG";

fn build_filter(verbose: bool) -> Option<EnvFilter> {
    let from_env = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    match (from_env, verbose) {
        (Some(directives), false) => Some(EnvFilter::builder().parse_lossy(directives)),
        (Some(directives), true) => Some(EnvFilter::builder().parse_lossy(format!("{directives},jq_synth=debug"))),
        (None, true) => Some(EnvFilter::new("jq_synth=debug")),
        (None, false) => None,
    }
}

pub fn init_tracing(verbose: bool) {
    let Some(filter) = build_filter(verbose) else {
        return;
    };
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
