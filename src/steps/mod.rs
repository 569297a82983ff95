//! Launch pipeline steps: ensure, activate, install, certificates, serve.
pub mod environment;
pub mod install;
pub mod pipeline;
pub mod runner;
pub mod serve;
pub mod tls;

pub use environment::{activate_environment, ensure_environment, EnsureOutcome};
pub use install::{install_dependencies, InstallOutcome};
pub use pipeline::{build_plan, run_pipeline, LaunchPlan, PlannedStep, StepAction, StepKind};
pub use runner::{ProcessOutcome, ProcessRunner, SystemRunner};
pub use serve::{launch_server, preflight_port};
pub use tls::{ensure_certificates, CertificateOutcome};
