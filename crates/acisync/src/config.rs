//! CLI configuration: thin wrapper around `acisync_config`.
//!
//! Re-exports the shared types and adds resolution that respects the
//! `GlobalOpts` flag overrides (--controller, --token, --insecure, --timeout).

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use acisync_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use acisync_config::{
    Config, Defaults, KEYRING_SERVICE, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// State file to use: `--state`, else the configured default.
pub fn state_path(global: &GlobalOpts, config: &Config) -> PathBuf {
    global
        .state
        .clone()
        .unwrap_or_else(|| config.defaults.state_file.clone())
}

/// Translate a `Profile` plus global flags into a `ControllerConfig`.
/// Flags take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    let url_str = global.controller.as_deref().unwrap_or(&profile.controller);
    let mut config = ControllerConfig::new(parse_url(url_str)?);

    config.token = Some(if let Some(ref token) = global.token {
        SecretString::from(token.clone())
    } else {
        acisync_config::resolve_token(profile, profile_name)?
    });

    config.tls = if global.insecure || defaults.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        acisync_config::profile_tls(profile)
    };

    let secs = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);
    config.timeout = Duration::from_secs(secs);
    Ok(config)
}

/// Build a `ControllerConfig` from the config file, profile, and CLI overrides.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    // No profile: flags and env vars alone.
    let url_str = global.controller.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let mut config = ControllerConfig::new(parse_url(url_str)?);

    let token = global.token.as_ref().ok_or_else(|| CliError::NoCredentials {
        profile: profile_name.clone(),
    })?;
    config.token = Some(SecretString::from(token.clone()));

    config.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    Ok(config)
}

fn parse_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {raw}"),
    })
}
