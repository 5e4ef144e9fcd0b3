use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use licitacao_core::{CompanyId, DomainError, DomainResult, Entity, round_money, typed_id};
use licitacao_processes::{ProcessId, ProcessItemId};

use crate::instrument::{InstrumentKind, InstrumentRef};

typed_id!(
    /// Linkage ("processo_item_vinculo") identifier.
    LinkageId
);

/// One slice of a process item assigned to exactly one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linkage {
    id: LinkageId,
    company_id: CompanyId,
    process_id: ProcessId,
    item_id: ProcessItemId,
    instrument: InstrumentRef,
    quantity: Decimal,
    unit_value: Decimal,
    total_value: Decimal,
}

impl Linkage {
    /// Build a linkage. `total_value` defaults to `quantity * unit_value` (rounded).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LinkageId,
        company_id: CompanyId,
        process_id: ProcessId,
        item_id: ProcessItemId,
        instrument: InstrumentRef,
        quantity: Decimal,
        unit_value: Decimal,
        total_value: Option<Decimal>,
    ) -> DomainResult<Self> {
        if quantity.is_sign_negative() || quantity.is_zero() {
            return Err(DomainError::validation("linkage quantity must be positive"));
        }
        if unit_value.is_sign_negative() {
            return Err(DomainError::validation(
                "linkage unit value cannot be negative",
            ));
        }
        let total_value = match total_value {
            Some(total) => total,
            None => round_money(quantity.checked_mul(unit_value).ok_or_else(|| {
                DomainError::validation("linkage total value is out of range")
            })?),
        };
        if total_value.is_sign_negative() {
            return Err(DomainError::validation(
                "linkage total value cannot be negative",
            ));
        }

        Ok(Self {
            id,
            company_id,
            process_id,
            item_id,
            instrument,
            quantity,
            unit_value,
            total_value,
        })
    }

    pub fn id_typed(&self) -> LinkageId {
        self.id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    pub fn item_id(&self) -> ProcessItemId {
        self.item_id
    }

    pub fn instrument(&self) -> InstrumentRef {
        self.instrument
    }

    pub fn kind(&self) -> InstrumentKind {
        self.instrument.kind()
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_value(&self) -> Decimal {
        self.unit_value
    }

    pub fn total_value(&self) -> Decimal {
        self.total_value
    }
}

impl Entity for Linkage {
    type Id = LinkageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
