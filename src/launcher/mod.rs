//! Configuration and runtime for the launcher process.
pub mod config;
pub mod runtime;
