//! Vigil CLI - Command-line interface for the Vigil domain trust cache.

use clap::Parser;
use vigil_cli::commands;
use vigil_cli::{App, Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> vigil_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    vigil_cli::logging::init(cli.log_level.as_deref());

    // Load config from the given path or ~/.vigil/config.toml
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let config = Config::load_from(&config_path)?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    if let Command::Config(args) = cli.command {
        return commands::execute_config(args, &config, &config_path, &formatter);
    }

    let app = App::build(config, cli.memory)?;

    match cli.command {
        Command::Check(args) => commands::execute_check(args, &app, &formatter).await?,
        Command::Lookup(args) => commands::execute_lookup(args, &app, &formatter).await?,
        Command::Watch(args) => commands::execute_watch(args, &app, &formatter).await?,
        Command::Evict(args) => commands::execute_evict(args, &app, &formatter).await?,
        Command::Clear => commands::execute_clear(&app, &formatter).await?,
        Command::Sweep(args) => commands::execute_sweep(args, &app, &formatter).await?,
        Command::Config(_) => {}
    }

    Ok(())
}
