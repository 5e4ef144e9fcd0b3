use std::sync::RwLock;

use serde_json::Value as JsonValue;

use licitacao_core::{AggregateId, CompanyId};
use licitacao_events::{CompanyScoped, EventEnvelope};

use crate::error::StoreError;
use crate::ports::EventSink;

/// Append-only in-memory event log.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    entries: RwLock<Vec<EventEnvelope<JsonValue>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events of one company, in append order.
    pub fn for_company(&self, company_id: CompanyId) -> Vec<EventEnvelope<JsonValue>> {
        match self.entries.read() {
            Ok(entries) => entries
                .iter()
                .filter(|e| CompanyScoped::company_id(*e) == company_id)
                .cloned()
                .collect(),
            Err(_) => vec![],
        }
    }

    pub fn for_aggregate(
        &self,
        company_id: CompanyId,
        aggregate_id: AggregateId,
    ) -> Vec<EventEnvelope<JsonValue>> {
        self.for_company(company_id)
            .into_iter()
            .filter(|e| e.aggregate_id() == aggregate_id)
            .collect()
    }

    /// Event types of one aggregate, in append order.
    pub fn event_types(&self, company_id: CompanyId, aggregate_id: AggregateId) -> Vec<String> {
        self.for_aggregate(company_id, aggregate_id)
            .iter()
            .map(|e| e.event_type().to_string())
            .collect()
    }
}

impl EventSink for InMemoryEventLog {
    fn append(&self, envelopes: Vec<EventEnvelope<JsonValue>>) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        // Sequence numbers must keep growing within an aggregate stream.
        for (idx, envelope) in envelopes.iter().enumerate() {
            let last = entries
                .iter()
                .chain(envelopes[..idx].iter())
                .filter(|e| {
                    e.company_id() == envelope.company_id()
                        && e.aggregate_id() == envelope.aggregate_id()
                })
                .map(|e| e.sequence_number())
                .max()
                .unwrap_or(0);
            if envelope.sequence_number() <= last {
                return Err(StoreError::Conflict(format!(
                    "non-monotonic sequence_number {} after {last}",
                    envelope.sequence_number()
                )));
            }
        }
        entries.extend(envelopes);
        Ok(())
    }
}
