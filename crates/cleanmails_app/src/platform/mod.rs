mod app;
mod config;
mod effects;
mod logging;
mod shell;
mod ui;

use crate::cli::{Cli, Command};

use self::config::AppConfig;
use self::logging::LogDestination;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    logging::initialize(if cli.verbose {
        LogDestination::Both
    } else {
        LogDestination::File
    });

    let mut config = AppConfig::load(&cli.config)?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    match cli.command {
        Command::Clean(args) => app::run_clean(&config, args),
        Command::Shell {
            file,
            upload,
            charset,
        } => app::run_shell(&config, file, upload.mode(), charset),
        Command::Verify { email, level } => app::run_verify(&config, &email, level),
        Command::NetworkCheck => app::run_network_check(&config),
    }
}
