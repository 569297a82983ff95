//! Shared library modules providing error types, file utilities, command builders, and telemetry initialization.

pub mod certgen;
pub mod command;
pub mod errors;
pub mod fs;
pub mod openssl;
pub mod paths;
pub mod telemetry;
pub mod uvicorn;
pub mod venv;
