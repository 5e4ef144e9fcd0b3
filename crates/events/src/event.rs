use chrono::{DateTime, Utc};

use licitacao_core::CompanyId;

/// A fact recorded by one company's process lifecycle.
///
/// Events are immutable and append-only. The payload schema is versioned so
/// stored envelopes stay readable when a variant gains fields.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "licitacao.process.payment_confirmed").
    fn event_type(&self) -> &'static str;

    /// Company that owns the event stream.
    fn company_id(&self) -> CompanyId;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;

    fn schema_version(&self) -> u32 {
        1
    }
}
