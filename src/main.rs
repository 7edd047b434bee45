//! hubgrep - regex search across every repository of a GitHub account
//!
//! Command-line usage:
//!   hubgrep [OPTIONS] <PATTERN>...
//!
//! Matches are written to stdout as CSV (`repo,file,line` or
//! `repo,file,group1..groupN`); progress and warnings go to stderr.

use clap::Parser;
use hubgrep::cli::{init_logging, run_cli, Cli};
use hubgrep::FatalError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    if let Err(err) = run_cli(&cli) {
        let code = err
            .downcast_ref::<FatalError>()
            .map(FatalError::exit_code)
            .unwrap_or(1);
        if code != 0 {
            log::error!("{:#}", err);
        }
        std::process::exit(code);
    }
}
