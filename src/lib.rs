//! Per-command defaults and logging setup for `google-music-scripts`.
//!
//! Two independent pieces share the settings-document model:
//!
//! - [`core::config_resolver::ConfigResolver`] merges the global, command-group and alias
//!   blocks of `[defaults]` into one flat, normalized option map.
//! - [`core::log_planner::plan_sinks`] turns a verbosity modifier into a [`models::SinkPlan`],
//!   which [`system::logging::LoggingState`] applies to the `log` façade.

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
