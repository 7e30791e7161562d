use clap::Parser;
use std::io;
use std::process::ExitCode;

use oci_metrics_plugin::{app, cli, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse_from(cli::normalize_args(std::env::args_os()));

    // Initialize logging
    logging::init_logger(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match app::execute(&cli, &mut out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
