use clap::Parser;
use tracing::error;

mod cli;
pub mod exit_codes;
mod logging;

use cli::args::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("fatal: {e}");
        std::process::exit(exit_codes::INTERNAL_ERROR);
    }

    let code = match cli::run::run(cli).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            error!("Error in main execution: {e}");
            exit_codes::for_error(&e)
        }
    };
    std::process::exit(code);
}
