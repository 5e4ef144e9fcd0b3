use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use licitacao_core::{AggregateId, CompanyId};

use crate::Event;

/// An event positioned in its aggregate stream.
///
/// `sequence_number` is the aggregate version once the event is applied, so a
/// stream for one `(company_id, aggregate_id)` is gap-free and strictly
/// increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    company_id: CompanyId,
    aggregate_id: AggregateId,
    aggregate_type: String,
    event_type: String,
    sequence_number: u64,
    occurred_at: DateTime<Utc>,
    schema_version: u32,
    payload: E,
}

impl<E> EventEnvelope<E> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_id: Uuid,
        company_id: CompanyId,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        event_type: impl Into<String>,
        sequence_number: u64,
        occurred_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            company_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            event_type: event_type.into(),
            sequence_number,
            occurred_at,
            schema_version: 1,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl EventEnvelope<JsonValue> {
    /// Wrap a domain event with a JSON payload, taking company, type, time and
    /// schema version from the event itself.
    pub fn record<T: Event + Serialize>(
        event_id: Uuid,
        aggregate_type: impl Into<String>,
        aggregate_id: AggregateId,
        sequence_number: u64,
        event: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id,
            company_id: event.company_id(),
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            event_type: event.event_type().to_string(),
            sequence_number,
            occurred_at: event.occurred_at(),
            schema_version: event.schema_version(),
            payload: serde_json::to_value(event)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, Serialize)]
    struct Paid {
        company_id: CompanyId,
        occurred_at: DateTime<Utc>,
    }

    impl Event for Paid {
        fn event_type(&self) -> &'static str {
            "licitacao.process.payment_confirmed"
        }

        fn company_id(&self) -> CompanyId {
            self.company_id
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.occurred_at
        }

        fn schema_version(&self) -> u32 {
            2
        }
    }

    #[test]
    fn record_copies_metadata_from_the_event() {
        let company_id = CompanyId::new();
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
        let event = Paid {
            company_id,
            occurred_at: at,
        };

        let envelope =
            EventEnvelope::record(Uuid::now_v7(), "licitacao.process", AggregateId::new(), 4, &event)
                .unwrap();

        assert_eq!(envelope.company_id(), company_id);
        assert_eq!(envelope.event_type(), "licitacao.process.payment_confirmed");
        assert_eq!(envelope.occurred_at(), at);
        assert_eq!(envelope.schema_version(), 2);
        assert_eq!(envelope.sequence_number(), 4);
        assert_eq!(envelope.payload()["company_id"], serde_json::json!(company_id));
    }

    #[test]
    fn envelope_survives_a_json_round_trip() {
        let envelope = EventEnvelope::new(
            Uuid::now_v7(),
            CompanyId::new(),
            AggregateId::new(),
            "licitacao.process",
            "licitacao.process.created",
            1,
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            serde_json::json!({ "numero": "PE 1/2024" }),
        );

        let json = serde_json::to_string(&envelope).unwrap();
        let back: EventEnvelope<JsonValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }
}
