mod battery;
mod config;
mod errors;
mod guard;
mod plug;

use clap::Parser;
use tracing::error;

use crate::config::Config;
use crate::errors::Error;
use crate::plug::TuyaPlug;

fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(2);
    }

    let probe = match battery::probe_for_host() {
        Ok(probe) => probe,
        Err(e) => return fail(&config, e),
    };
    let plug = TuyaPlug::new(config.clone());

    if let Err(e) = guard::run(&config, probe.as_ref(), &plug) {
        fail(&config, e);
    }
}

/// Top-level failure policy: log and exit cleanly by default, exit non-zero
/// when strict error mode is enabled.
fn fail(config: &Config, e: Error) {
    error!("Execution error: {}", e);
    if config.strict_errors {
        std::process::exit(1);
    }
}
