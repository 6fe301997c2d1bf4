//! Activate command - reconcile caches against the previous manifest

use crate::cli::create_worker;
use crate::config::Config;
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::ui::{self, UiContext};
use crate::worker::{ActivateOutcome, LifecycleHandler};

/// Execute the activate command
pub async fn execute(config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let worker = create_worker(config).await?;

    match worker.on_activate().await {
        ActivateOutcome::Reset { reason } => Err(ShellCacheError::User(format!(
            "Activation failed and all caches were reset: {}",
            reason
        ))),
        outcome => {
            ui::step_ok(&ctx, &format!("Activated: {}", outcome));
            Ok(())
        }
    }
}
