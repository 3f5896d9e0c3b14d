// Inherit lint configuration from lib.rs for consistency
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use engine_devtools::cli::commands::TidyCli;
use engine_devtools::cli::{logging, output};
use engine_devtools::config::Config;
use engine_devtools::tidy;

fn main() {
    let cli = TidyCli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", output::format_error(&e));
            std::process::exit(1);
        }
    }
}

fn run(cli: &TidyCli) -> engine_devtools::error::Result<i32> {
    let config = Config::resolve(cli.project_root.as_deref())?;
    tracing::info!(root = %config.project_root.display(), "project root");

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }

    tidy::analyze(&config, &cli.request(), interrupt)
}
