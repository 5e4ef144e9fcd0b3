//! Collaborator contracts consumed by the lifecycle service.
//!
//! Persistence mechanics live behind these traits; every call is scoped to a
//! company explicitly.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use licitacao_core::{CompanyId, ExpectedVersion};
use licitacao_events::EventEnvelope;
use licitacao_fulfillment::{Instrument, InstrumentRef, Invoice, Linkage, Quotation};
use licitacao_processes::{Process, ProcessId, ProcessItem, ProcessItemId, ProcessTransition};

use crate::error::StoreError;

pub trait ProcessRepository: Send + Sync {
    /// Deleted processes are still returned; visibility is decided by the caller.
    fn find(&self, company_id: CompanyId, process_id: ProcessId)
    -> Result<Option<Process>, StoreError>;

    /// Store `process`, checking the stored version against `expected`.
    fn save(&self, process: Process, expected: ExpectedVersion) -> Result<Process, StoreError>;
}

pub trait ItemRepository: Send + Sync {
    fn find(
        &self,
        company_id: CompanyId,
        item_id: ProcessItemId,
    ) -> Result<Option<ProcessItem>, StoreError>;

    /// Items of a process, ordered by item number.
    fn list_for_process(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> Result<Vec<ProcessItem>, StoreError>;

    fn save(&self, item: ProcessItem) -> Result<ProcessItem, StoreError>;

    /// Store several items as one write.
    fn save_all(&self, items: Vec<ProcessItem>) -> Result<(), StoreError>;
}

/// Read access to linkages.
pub trait LinkageProvider: Send + Sync {
    fn linkages_for_item(
        &self,
        company_id: CompanyId,
        item_id: ProcessItemId,
    ) -> Result<Vec<Linkage>, StoreError>;

    fn linkages_for_process(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> Result<Vec<Linkage>, StoreError>;
}

/// Read access to invoices, keyed by the instrument they bill.
pub trait InvoiceProvider: Send + Sync {
    fn invoices_for_instrument(
        &self,
        company_id: CompanyId,
        instrument: InstrumentRef,
    ) -> Result<Vec<Invoice>, StoreError>;
}

pub trait QuotationProvider: Send + Sync {
    /// The quotation flagged as the chosen supplier of the item, if any.
    fn chosen_for(
        &self,
        company_id: CompanyId,
        item_id: ProcessItemId,
    ) -> Result<Option<Quotation>, StoreError>;
}

pub trait InstrumentProvider: Send + Sync {
    fn instruments_for_process(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> Result<Vec<Instrument>, StoreError>;
}

/// Answer of a status-transition policy (`{pode, motivo}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    #[serde(rename = "pode")]
    pub allowed: bool,
    #[serde(rename = "motivo")]
    pub reason: String,
}

impl PolicyDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Guard consulted for moves to `perdido` and `arquivado`.
pub trait StatusTransitionPolicy: Send + Sync {
    fn evaluate(
        &self,
        process: &Process,
        items: &[ProcessItem],
        transition: ProcessTransition,
    ) -> PolicyDecision;
}

/// Destination of the events emitted by lifecycle operations.
///
/// `append` is the commit point of every operation: it runs before the
/// process and item writes and must reject the whole batch when a sequence
/// number is not past the last one stored for its `(company, aggregate)`
/// stream. A persistent implementation should share one transaction with the
/// repositories so the writes that follow are covered as well.
pub trait EventSink: Send + Sync {
    fn append(&self, envelopes: Vec<EventEnvelope<JsonValue>>) -> Result<(), StoreError>;
}
