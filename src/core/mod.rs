// src/core/mod.rs

pub mod commands;
pub mod config_resolver;
pub mod document_store;
pub mod log_planner;
pub mod paths;
