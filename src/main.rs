mod cli;
mod lib;
mod load;

use chrono::Datelike;
use clap::ArgMatches;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cli::{args, render};
use lib::{error::Error, invoice::Invoice};

fn main() {
    init_tracing();
    let matches = args::app().get_matches();
    match run(&matches, chrono::Local::now().year()) {
        Ok(path) => println!("PDF generated: {}", path.display()),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (warnings only by default)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &ArgMatches<'_>, current_year: i32) -> Result<PathBuf, Error> {
    let opts = args::options(matches, current_year)?;
    let config = load::read_config(&opts.config)?;
    let invoice = Invoice::build(&config, &opts.request());
    tracing::debug!(number = %invoice.number, items = invoice.items.len(), "invoice ready");
    render::save(&invoice, &opts.output)
}
