use licitacao_core::CompanyId;

use crate::EventEnvelope;

/// Marks messages that belong to exactly one company.
///
/// Stores and sinks use it to keep one company's events out of another's stream.
pub trait CompanyScoped {
    fn company_id(&self) -> CompanyId;
}

impl<E> CompanyScoped for EventEnvelope<E> {
    fn company_id(&self) -> CompanyId {
        EventEnvelope::company_id(self)
    }
}
