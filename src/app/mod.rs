//! App module - everything that touches the outside world
//!
//! - Configuration loading
//! - Logging setup
//! - Slack delivery (and the dry-run stand-in)

pub mod config;
pub mod logging;
pub mod slack;
