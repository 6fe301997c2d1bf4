//! shellcache - offline resource cache manager
//!
//! Precaches an application shell, reconciles cached resources against a
//! build manifest across deploys, and serves requests from the cache so the
//! application keeps working without a network.

pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod network;
pub mod storage;
pub mod ui;
pub mod worker;

pub use error::{ShellCacheError, ShellCacheResult};
