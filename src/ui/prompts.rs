//! Confirmation prompts with a non-interactive fallback

use super::context::UiContext;
use crate::error::{ShellCacheError, ShellCacheResult};

/// Ask a yes/no question.
///
/// Auto-yes returns `true` without asking. A non-interactive context returns
/// `default` without touching stdin.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> ShellCacheResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| ShellCacheError::Internal(format!("prompt task failed: {}", e)))?
    .map_err(|e| ShellCacheError::User(format!("Prompt failed: {}", e)))
}
