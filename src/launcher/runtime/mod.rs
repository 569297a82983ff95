//! Launcher startup and exit-status mapping.
mod startup;

pub use startup::{run_launcher, RuntimeExit};
