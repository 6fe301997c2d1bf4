//! Message command - deliver a control message to the worker

use crate::cli::args::MessageArgs;
use crate::cli::create_worker;
use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::ui::{self, UiContext};
use crate::worker::{LifecycleHandler, MessageOutcome};

/// Execute the message command
pub async fn execute(args: MessageArgs, config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect();
    let worker = create_worker(config).await?;

    match worker.on_message(&args.data).await? {
        MessageOutcome::SkippedWaiting => ui::step_ok(&ctx, "Worker will activate immediately"),
        MessageOutcome::Synced { downloaded } => {
            ui::step_ok(&ctx, &format!("Downloaded {} resources for offline use", downloaded))
        }
        MessageOutcome::Ignored => {
            ui::step_info(&ctx, &format!("Ignored unrecognized message {:?}", args.data))
        }
    }
    Ok(())
}
