//! Show command - displays information.

use anyhow::Result;

use crate::config::Config;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show configured fixups with their selectors
    Fixups,
}

/// Execute the show command.
pub fn cmd_show(target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Config => config.print(),
        ShowTarget::Fixups => {
            if config.fixups.is_empty() {
                println!("No fixups configured.");
            }
            for directive in config.fixups.iter() {
                println!("{}: {}", directive.selector, directive.command);
            }
        }
    }
    Ok(())
}
