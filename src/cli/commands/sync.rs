//! Sync command - make the whole application available offline

use crate::cli::create_worker;
use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::ui::{self, UiContext};

/// Execute the sync command
pub async fn execute(config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let worker = create_worker(config).await?;
    let downloaded = worker.download_offline().await?;

    if downloaded == 0 {
        ui::step_info(&ctx, "All resources already cached");
    } else {
        ui::step_ok(&ctx, &format!("Downloaded {} resources", downloaded));
    }
    Ok(())
}
