//! BlueStitch CLI - Command-line interface
//!
//! Renders elevation-shaded composites from a tiled web map.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::locate::LocateArgs;
use commands::render::RenderArgs;

#[derive(Parser)]
#[command(name = "bluestitch")]
#[command(version, about = "Render elevation-shaded composites from tiled web maps", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, blend and stitch a tile range into one image
    Render(RenderArgs),

    /// Convert world block positions to tile indices
    Locate(LocateArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render(args) => commands::render::run(args, cli.debug),
        Commands::Locate(args) => commands::locate::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
