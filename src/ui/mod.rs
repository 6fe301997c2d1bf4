//! Terminal output and prompts shared by the CLI commands
//!
//! Uses `cliclack` for interactive terminals, with plain output in CI or
//! when stdout/stdin are not a TTY.

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{key_value, section, step_info, step_ok, step_ok_detail, step_warn, step_warn_hint};
pub use prompts::confirm;
