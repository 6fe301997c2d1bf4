//! Clear command - delete every cache the worker owns

use crate::cli::args::ClearArgs;
use crate::cli::create_worker;
use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::ui::{self, UiContext};

/// Execute the clear command
pub async fn execute(args: ClearArgs, config: &Config) -> ShellCacheResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let worker = create_worker(config).await?;

    let question = format!("Delete all caches for {}?", worker.origin());
    if !ui::confirm(&ctx, &question, false).await? {
        ui::step_info(&ctx, "Aborted, nothing deleted (pass --yes to skip the prompt)");
        return Ok(());
    }

    let deleted = worker.clear().await?;
    if deleted.is_empty() {
        ui::step_info(&ctx, "No caches to delete");
    } else {
        ui::step_ok_detail(
            &ctx,
            &format!("Deleted {} caches", deleted.len()),
            &deleted.join(", "),
        );
    }
    Ok(())
}
