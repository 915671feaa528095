//! CLI configuration: thin wrapper around `solity_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--username, --password, --base-url, --timeout).

use secrecy::SecretString;
use solity_core::IntegrationConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use solity_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate the active profile + global flags into an `IntegrationConfig`.
///
/// Flags take priority over profile values. Without a profile, flags and
/// environment alone must supply username and password.
pub fn resolve_integration_config(
    global: &GlobalOpts,
) -> Result<(String, IntegrationConfig), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None if global.username.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
            names.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref username) = global.username {
        profile.username.clone_from(username);
    }
    if let Some(ref base_url) = global.base_url {
        profile.base_url = Some(base_url.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let config = match global.password {
        Some(ref password) => solity_config::integration_config(
            &profile,
            &cfg.defaults,
            SecretString::from(password.clone()),
        )?,
        None => solity_config::profile_to_integration_config(&profile, &profile_name, &cfg.defaults)?,
    };

    Ok((profile_name, config))
}
