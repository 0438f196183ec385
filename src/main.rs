//! theme-env - minimized SDDM theme environment builder.
//!
//! Copies an SDDM theme together with exactly the QML modules and native
//! plugins it uses, for early-boot environments where space is tight.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use theme_env::commands;
use theme_env::config::Config;

#[derive(Parser)]
#[command(name = "theme-env")]
#[command(about = "Minimized SDDM theme environment builder")]
#[command(
    after_help = "INPUTS:\n  --attrs or NIX_ATTRS_JSON_FILE  Attribute file (rawEnv, qmlModules, fixups)\n  --out or $out                   Output root"
)]
struct Cli {
    /// Attribute file written by the build orchestrator
    #[arg(long, global = true)]
    attrs: Option<PathBuf>,

    /// Output root for the theme environment
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the theme environment
    Build,

    /// Run preflight checks (verify inputs before build)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// Show configured fixups
    Fixups,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "theme_env=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::load(cli.attrs, cli.out)?;

    match cli.command {
        Commands::Build => {
            commands::cmd_build(&config)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&config, strict)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Fixups => commands::show::ShowTarget::Fixups,
            };
            commands::cmd_show(show_target, &config)?;
        }
    }

    Ok(())
}
