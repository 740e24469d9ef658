//! Configuration management CLI commands.
//!
//! Provides `config init`, `config show` and `config path`.

use clap::Subcommand;

use bluestitch::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init { force } => run_init(force),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_init(force: bool) -> Result<(), CliError> {
    let path = config_file_path();

    if force {
        ConfigFile::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
    } else if ConfigFile::ensure_exists_at(&path)? {
        println!("Created {}", path.display());
    } else {
        println!("Configuration already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
    }

    Ok(())
}

fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let blend = &config.render.blend;

    println!("[source]");
    println!(
        "  map_address = {}",
        config.source.map_address.as_deref().unwrap_or("(not set)")
    );
    println!("  tile_path   = {}", config.source.tile_path);
    println!("  world       = {}", config.source.world);
    println!();
    println!("[render]");
    println!("  contour     = {}", blend.contour);
    println!("  interval    = {}", blend.interval);
    println!("  radius      = {}", blend.radius);
    println!("  best_fit    = {}", blend.best_fit);
    println!(
        "  fit         = {} ({}..={}, {})",
        blend.fit, blend.low_threshold, blend.high_threshold, blend.fit_color
    );
    println!("  lower       = {} ({})", blend.lower, blend.lower_color);
    println!("  upper       = {} ({})", blend.upper, blend.upper_color);
    println!("  opacity     = {}", blend.opacity);
    println!();
    println!("[download]");
    println!("  timeout     = {}s", config.download.timeout);
    println!("  parallel    = {}", config.download.parallel);
    println!();
    println!("[logging]");
    println!("  file        = {}", config.logging.file.display());

    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}
