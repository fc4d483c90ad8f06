//! Lumina CLI - data service maintenance and editor account tools.
//!
//! # Usage
//!
//! ```bash
//! # Check that the data service answers
//! lumina-cli check
//!
//! # Seed empty tables with the built-in catalog
//! lumina-cli seed
//!
//! # Wipe everything and reseed (destructive)
//! lumina-cli reset --yes
//!
//! # Print the stored site configuration
//! lumina-cli config show
//!
//! # Create the editor account
//! lumina-cli editor create -e editor@example.com -p 'a long passphrase'
//! ```
//!
//! # Commands
//!
//! - `check` - Ping the data service
//! - `seed` - Seed empty tables
//! - `reset` - Replace all data with the defaults
//! - `config show` - Dump the site configuration as JSON
//! - `editor create` - Create a confirmed account (needs the service-role key)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lumina-cli")]
#[command(author, version, about = "Lumina CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the data service connection
    Check,
    /// Seed empty tables with the built-in catalog
    Seed,
    /// Delete all products and classifications, then reseed
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Inspect the site configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage the editor account
    Editor {
        #[command(subcommand)]
        action: EditorAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the stored site configuration as JSON
    Show,
}

#[derive(Subcommand)]
enum EditorAction {
    /// Create a confirmed account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Password (falls back to `LUMINA_EDITOR_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check => commands::catalog::check().await?,
        Commands::Seed => commands::catalog::seed().await?,
        Commands::Reset { yes } => commands::catalog::reset(yes).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::catalog::show_config().await?,
        },
        Commands::Editor { action } => match action {
            EditorAction::Create { email, password } => {
                commands::editor::create_user(&email, password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_reset_flag() {
        let cli = Cli::try_parse_from(["lumina-cli", "reset", "--yes"]);
        assert!(matches!(cli.map(|c| c.command), Ok(Commands::Reset { yes: true })));
    }
}
