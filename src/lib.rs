//! Library crate root re-exporting the launcher, pipeline steps, and shared helpers.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod cli;
pub mod launcher;
pub mod steps;
