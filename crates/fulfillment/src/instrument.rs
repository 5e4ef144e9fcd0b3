use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use licitacao_core::{CompanyId, DomainError, DomainResult, typed_id};
use licitacao_processes::ProcessId;

typed_id!(
    /// Contract identifier.
    ContractId
);
typed_id!(
    /// Supply authorization ("autorização de fornecimento", AF) identifier.
    SupplyAuthorizationId
);
typed_id!(
    /// Purchase commitment ("empenho") identifier.
    PurchaseCommitmentId
);

/// The three kinds of fulfillment instrument a linkage can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Contract,
    SupplyAuthorization,
    PurchaseCommitment,
}

impl InstrumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentKind::Contract => "contrato",
            InstrumentKind::SupplyAuthorization => "autorizacao_fornecimento",
            InstrumentKind::PurchaseCommitment => "empenho",
        }
    }
}

/// Typed reference to exactly one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum InstrumentRef {
    Contract(ContractId),
    SupplyAuthorization(SupplyAuthorizationId),
    PurchaseCommitment(PurchaseCommitmentId),
}

impl InstrumentRef {
    pub fn kind(&self) -> InstrumentKind {
        match self {
            InstrumentRef::Contract(_) => InstrumentKind::Contract,
            InstrumentRef::SupplyAuthorization(_) => InstrumentKind::SupplyAuthorization,
            InstrumentRef::PurchaseCommitment(_) => InstrumentKind::PurchaseCommitment,
        }
    }

    pub fn is_commitment(&self) -> bool {
        self.kind() == InstrumentKind::PurchaseCommitment
    }
}

impl core::fmt::Display for InstrumentRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InstrumentRef::Contract(id) => write!(f, "contrato:{id}"),
            InstrumentRef::SupplyAuthorization(id) => write!(f, "autorizacao_fornecimento:{id}"),
            InstrumentRef::PurchaseCommitment(id) => write!(f, "empenho:{id}"),
        }
    }
}

/// Fields shared by every instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentHeader {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub number: String,
    /// Total value of the document ("valor_total").
    pub total_value: Decimal,
    pub issued_on: Option<NaiveDate>,
}

impl InstrumentHeader {
    fn validate(&self) -> DomainResult<()> {
        if self.number.trim().is_empty() {
            return Err(DomainError::validation("instrument number is required"));
        }
        if self.total_value.is_sign_negative() {
            return Err(DomainError::validation(
                "instrument total value cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Contract signed with the government body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    #[serde(flatten)]
    pub header: InstrumentHeader,
}

/// Order-to-deliver document, alternative to a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyAuthorization {
    pub id: SupplyAuthorizationId,
    #[serde(flatten)]
    pub header: InstrumentHeader,
}

/// Budgetary commitment issued by the government body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseCommitment {
    pub id: PurchaseCommitmentId,
    #[serde(flatten)]
    pub header: InstrumentHeader,
}

/// Any fulfillment instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instrument {
    Contract(Contract),
    SupplyAuthorization(SupplyAuthorization),
    PurchaseCommitment(PurchaseCommitment),
}

impl Instrument {
    pub fn contract(id: ContractId, header: InstrumentHeader) -> DomainResult<Self> {
        header.validate()?;
        Ok(Instrument::Contract(Contract { id, header }))
    }

    pub fn supply_authorization(
        id: SupplyAuthorizationId,
        header: InstrumentHeader,
    ) -> DomainResult<Self> {
        header.validate()?;
        Ok(Instrument::SupplyAuthorization(SupplyAuthorization { id, header }))
    }

    pub fn purchase_commitment(
        id: PurchaseCommitmentId,
        header: InstrumentHeader,
    ) -> DomainResult<Self> {
        header.validate()?;
        Ok(Instrument::PurchaseCommitment(PurchaseCommitment { id, header }))
    }

    pub fn reference(&self) -> InstrumentRef {
        match self {
            Instrument::Contract(c) => InstrumentRef::Contract(c.id),
            Instrument::SupplyAuthorization(a) => InstrumentRef::SupplyAuthorization(a.id),
            Instrument::PurchaseCommitment(p) => InstrumentRef::PurchaseCommitment(p.id),
        }
    }

    pub fn kind(&self) -> InstrumentKind {
        self.reference().kind()
    }

    pub fn header(&self) -> &InstrumentHeader {
        match self {
            Instrument::Contract(c) => &c.header,
            Instrument::SupplyAuthorization(a) => &a.header,
            Instrument::PurchaseCommitment(p) => &p.header,
        }
    }

    pub fn process_id(&self) -> ProcessId {
        self.header().process_id
    }

    pub fn company_id(&self) -> CompanyId {
        self.header().company_id
    }

    pub fn total_value(&self) -> Decimal {
        self.header().total_value
    }
}
