//! Install command - precache the app shell

use crate::cli::create_worker;
use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::ui::{self, UiContext};
use crate::worker::LifecycleHandler;

/// Execute the install command
pub async fn execute(config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let worker = create_worker(config).await?;
    let installed = worker.on_install().await?;

    ui::step_ok_detail(
        &ctx,
        &format!("Installed {} shell files", installed),
        &worker.cache_names().temp,
    );
    Ok(())
}
