use clap::Parser;

use accelctl::cli::{self, Cli};
use accelctl::logging;

fn main() {
    logging::init();
    let args = Cli::parse();
    if let Err(err) = cli::run(&args) {
        eprintln!("accelctl: {err}");
        std::process::exit(err.exit_code());
    }
}
