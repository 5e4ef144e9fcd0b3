//! Procurement process domain module.
//!
//! Business rules for a bidding process ("licitação") and its line items,
//! implemented as deterministic domain logic (no IO, no storage).
//!
//! - [`status`]: the closed status set and the transition table.
//! - [`process`]: the `Process` aggregate (commands → events → apply).
//! - [`item`]: `ProcessItem`, its candidate unit values and derived financials.

pub mod item;
pub mod process;
pub mod status;

pub use item::{
    CandidateValues, FinalSituation, ItemFinancials, ItemStatus, ProcessItem, ProcessItemId,
};
pub use process::{
    ChangeStatus, CreateProcess, DeleteProcess, DetailsUpdated, FinalizeReason, LossRecorded,
    Modality, ParticipationStatus, ParticipationStatusChanged, PaymentConfirmed, Process,
    ProcessClosed, ProcessCommand, ProcessCreated, ProcessDeleted, ProcessDetails, ProcessEvent,
    ProcessId, SetParticipationStatus, StatusChange, StatusChanged, UpdateDetails,
};
pub use status::{ProcessStatus, ProcessTransition, TransitionTable};
