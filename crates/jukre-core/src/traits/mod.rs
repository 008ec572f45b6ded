//! Trait seams for the agent
//!
//! The scheduler loop and the status reporter are written against these
//! traits so the remote API and the host process manager can be replaced
//! by test doubles in contract tests.

pub mod api_probe;
pub mod service_control;

pub use api_probe::{ApiProbe, ProbeOutcome};
pub use service_control::{ServiceControl, ServiceState};
