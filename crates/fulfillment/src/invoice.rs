use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use licitacao_core::{CompanyId, DomainError, DomainResult, Entity, typed_id};

use crate::instrument::InstrumentRef;

typed_id!(
    /// Invoice ("nota fiscal") identifier.
    InvoiceId
);

/// Direction of a fiscal document ("tipo").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceDirection {
    /// Incoming: a cost the company pays its suppliers.
    Entrada,
    /// Outgoing: revenue billed to the government body.
    Saida,
}

/// Settlement state of an invoice ("situacao").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Settlement {
    Pendente,
    Paga,
    Cancelada,
}

/// Which settlement states to include in a sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettlementFilter {
    #[default]
    Any,
    Only(Settlement),
}

impl SettlementFilter {
    pub fn accepts(self, settlement: Settlement) -> bool {
        match self {
            SettlementFilter::Any => true,
            SettlementFilter::Only(wanted) => wanted == settlement,
        }
    }
}

/// Fiscal document, read-only for the valuation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    company_id: CompanyId,
    number: String,
    direction: InvoiceDirection,
    settlement: Settlement,
    value: Decimal,
    instrument: Option<InstrumentRef>,
    issued_on: Option<NaiveDate>,
}

impl Invoice {
    pub fn new(
        id: InvoiceId,
        company_id: CompanyId,
        number: impl Into<String>,
        direction: InvoiceDirection,
        settlement: Settlement,
        value: Decimal,
    ) -> DomainResult<Self> {
        if value.is_sign_negative() {
            return Err(DomainError::validation("invoice value cannot be negative"));
        }

        Ok(Self {
            id,
            company_id,
            number: number.into(),
            direction,
            settlement,
            value,
            instrument: None,
            issued_on: None,
        })
    }

    /// Attach the invoice to the instrument it bills.
    pub fn attached_to(mut self, instrument: InstrumentRef) -> Self {
        self.instrument = Some(instrument);
        self
    }

    pub fn issued(mut self, on: NaiveDate) -> Self {
        self.issued_on = Some(on);
        self
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn direction(&self) -> InvoiceDirection {
        self.direction
    }

    pub fn settlement(&self) -> Settlement {
        self.settlement
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn instrument(&self) -> Option<InstrumentRef> {
        self.instrument
    }

    pub fn issued_on(&self) -> Option<NaiveDate> {
        self.issued_on
    }

    /// Matches a direction and a settlement filter.
    pub fn matches(&self, direction: InvoiceDirection, filter: SettlementFilter) -> bool {
        self.direction == direction && filter.accepts(self.settlement)
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
