use clap::Parser;
use openai_helper::cli::{self, Cli};
use openai_helper::logging::{self, LoggingConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging_config = LoggingConfig {
        log_level: cli.log_level.clone(),
        format: cli.log_format,
    };
    if let Err(e) = logging::init_logging(&logging_config) {
        eprintln!("warning: {}", e);
    }

    match cli::run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
