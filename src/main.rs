use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tinote::cli::{self, Cli};
use tinote::config::Config;
use tinote::db::Database;

/// Initialize tracing on stderr so stdout only carries command output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tinote=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = Config::resolve(cli.file)?;
    let db = Database::open(config.data_file)?;

    match db.migrate().and_then(|_| cli::execute(command, &db)) {
        Ok(message) => {
            println!("{message}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
