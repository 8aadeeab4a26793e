use std::process::ExitCode;

use clap::Parser;

use tintbook::cli;
use tintbook::logger;

fn main() -> ExitCode {
    logger::init();
    let args = cli::CliArgs::parse();
    cli::run(args)
}
