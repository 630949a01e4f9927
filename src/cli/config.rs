use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::ConfigAction;
use crate::config::AppConfig;
use crate::console::Console;

/// Config file in use: `--config` when given, the default location otherwise.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(AppConfig::config_path()?),
    }
}

/// Load configuration. An explicit path must exist; the default one may not.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => AppConfig::load(),
    }
}

pub fn handle_config(action: ConfigAction, explicit: Option<&Path>, console: &Console) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(explicit)?;
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            console.plain(rendered.trim_end());
        }
        ConfigAction::Path => {
            let path = resolve_config_path(explicit)?;
            console.plain(&path.display().to_string());
        }
        ConfigAction::Init { force } => {
            let path = resolve_config_path(explicit)?;
            if path.exists() && !force {
                console.warning(&format!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                ));
                return Ok(());
            }
            AppConfig::default().save_to(&path)?;
            console.success(&format!("Wrote default config to {}", path.display()));
        }
    }

    Ok(())
}
