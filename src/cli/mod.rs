//! Command-line adapter around the offline cache worker

pub mod args;
pub mod commands;
mod factory;

pub use args::{Cli, Commands};
pub use factory::create_worker;
