//! Main application entry point (native).

use clap::Parser;
use ownerchart_app::{App, AppConfig, AppError, Cli};

fn run(cli: Cli) -> Result<(), AppError> {
    let command = cli.into_command();

    let config = AppConfig::from_env();
    let storage = config.open_storage()?;
    log::debug!("Using data directory {:?}", storage.dir());

    let mut app = App::open(storage, config);
    app.run(command, &mut std::io::stdout().lock())
}

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting OwnerChart");

    if let Err(e) = run(cli) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
