// # jukre-core
//
// Core library for the Juk.RE DDNS keepalive agent.
//
// ## Architecture Overview
//
// - **ConfigStore**: small self-healing key-value configuration
// - **EventLog**: append-only JSON-lines journal with size-based rotation
// - **reduce**: bounded backward scan reconstructing latest-per-kind state
// - **ApiProbe**: trait for the two remote calls (ping, ddns update)
// - **Agent**: the periodic scheduler loop with cancellable waiting
// - **status**: merges live probes with log-derived history
// - **ServiceControl**: trait for the host process-lifecycle collaborator
//
// ## Design Principles
//
// 1. **Log as database**: current state is derived by scanning the event
//    journal backward with a fixed byte budget, never from an in-memory
//    index or cache.
// 2. **Failures are values**: probe and parse failures travel as outcome
//    values checked at each call site; only an explicit stop signal can
//    end the scheduler loop.
// 3. **One writer**: the Agent owns the journal handle; control and status
//    invocations are strictly readers.

pub mod agent;
pub mod config;
pub mod error;
pub mod journal;
pub mod probe;
pub mod status;
pub mod traits;

// Re-export core types for convenience
pub use agent::Agent;
pub use config::{AgentConfig, ConfigStore, Paths};
pub use error::{Error, Result};
pub use journal::{EventKind, EventLog, EventRecord};
pub use probe::HttpApiProbe;
pub use status::StatusReport;
pub use traits::{ApiProbe, ProbeOutcome, ServiceControl, ServiceState};
