//! Binary-side orchestration: settings, terminal, live display, exit codes.

pub(crate) mod config;
pub(crate) mod config_runtime;
pub(crate) mod exit_handler;
pub(crate) mod progress_manager;
pub(crate) mod runtime;
pub(crate) mod terminal;
