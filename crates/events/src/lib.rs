//! Domain events emitted by the process lifecycle.
//!
//! Events are plain data: the engine emits them and collaborators decide what
//! to do with them (audit trail, notifications, cache invalidation).

pub mod envelope;
pub mod event;
pub mod scoped;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use scoped::CompanyScoped;
