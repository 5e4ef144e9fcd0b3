//! Infrastructure layer: collaborator contracts, in-memory stores, status
//! policy, configuration and the process lifecycle service.

pub mod config;
pub mod error;
pub mod event_log;
pub mod lifecycle;
pub mod memory;
pub mod policy;
pub mod ports;
pub mod store;


pub use config::EngineConfig;
pub use error::{LifecycleError, StoreError};
pub use event_log::InMemoryEventLog;
pub use lifecycle::{Collaborators, LifecycleResult, PaymentConfirmation, ProcessLifecycleService};
pub use memory::InMemoryBackend;
pub use policy::DefaultStatusPolicy;
pub use ports::PolicyDecision;

/// Install process-wide tracing with the configured output format.
pub fn init_tracing(config: &EngineConfig) {
    licitacao_observability::init_with(config.log_format);
}
