//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "worker.origin",
    "worker.bundle",
    "storage.dir",
    "storage.content_cache",
    "storage.temp_cache",
    "storage.manifest_cache",
    "network.max_body_bytes",
    "network.user_agent",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    manager: &ConfigManager,
    config: &Config,
) -> ShellCacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> ShellCacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());

    Ok(())
}

async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> ShellCacheResult<()> {
    // Edit the file as written so relative paths stay relative
    let mut config = if manager.path().exists() {
        manager.load_from_file(manager.path()).await?
    } else {
        Config::default()
    };

    apply(&mut config, key, value)?;
    let ctx = UiContext::detect();
    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> ShellCacheResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(ShellCacheError::User(format!(
                    "log_format must be \"text\" or \"json\", got {:?}",
                    value
                )))
            }
        },

        ["worker", "origin"] => config.worker.origin = value.to_string(),
        ["worker", "bundle"] => config.worker.bundle = PathBuf::from(value),

        ["storage", "dir"] => config.storage.dir = PathBuf::from(value),
        ["storage", "content_cache"] => config.storage.content_cache = value.to_string(),
        ["storage", "temp_cache"] => config.storage.temp_cache = value.to_string(),
        ["storage", "manifest_cache"] => config.storage.manifest_cache = value.to_string(),

        ["network", "max_body_bytes"] => {
            config.network.max_body_bytes = value.parse().map_err(|_| {
                ShellCacheError::User(format!("Invalid byte count: {}", value))
            })?
        }
        ["network", "user_agent"] => config.network.user_agent = value.to_string(),

        _ => {
            return Err(ShellCacheError::User(format!(
                "Unknown config key '{}'. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}
