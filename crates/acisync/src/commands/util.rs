//! Shared helpers for command handlers.

use std::io::IsTerminal;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::state::StateStore;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Open the state file selected by `--state` or the config default.
pub fn open_state(global: &GlobalOpts) -> Result<StateStore, CliError> {
    let cfg = config::load_config_or_default();
    StateStore::load(&config::state_path(global, &cfg))
}
