use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use licitacao_core::{CompanyId, DomainError, DomainResult, Entity, ValueObject, typed_id};

use crate::process::ProcessId;

typed_id!(
    /// Process item identifier.
    ProcessItemId
);

/// Judging status of one item ("status_item").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "aceito")]
    Accepted,
    #[serde(rename = "aceito_habilitado")]
    AcceptedQualified,
    #[serde(rename = "desclassificado")]
    Declassified,
    #[serde(rename = "inabilitado")]
    Disqualified,
    #[serde(rename = "aguardando_entrega")]
    AwaitingDelivery,
    #[serde(rename = "em_execucao")]
    InExecution,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Pending => "pendente",
            ItemStatus::Accepted => "aceito",
            ItemStatus::AcceptedQualified => "aceito_habilitado",
            ItemStatus::Declassified => "desclassificado",
            ItemStatus::Disqualified => "inabilitado",
            ItemStatus::AwaitingDelivery => "aguardando_entrega",
            ItemStatus::InExecution => "em_execucao",
        }
    }

    /// Accepted or accepted-qualified.
    pub fn is_accepted(self) -> bool {
        matches!(self, ItemStatus::Accepted | ItemStatus::AcceptedQualified)
    }

    /// Statuses counted in the awarded balance.
    pub fn is_pending_fulfillment(self) -> bool {
        matches!(
            self,
            ItemStatus::Accepted
                | ItemStatus::AcceptedQualified
                | ItemStatus::AwaitingDelivery
                | ItemStatus::InExecution
        )
    }

    fn is_fulfillment_stage(self) -> bool {
        matches!(self, ItemStatus::AwaitingDelivery | ItemStatus::InExecution)
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome once judging concludes ("situacao_final").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalSituation {
    #[serde(rename = "vencido")]
    Won,
    #[serde(rename = "perdido")]
    Lost,
}

/// Candidate unit values of an item, from least to most authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateValues {
    /// Estimated unit value ("valor_estimado").
    pub estimated: Option<Decimal>,
    /// Minimum sale value ("valor_minimo_venda"); informative, never used for awarding.
    pub minimum_sale: Option<Decimal>,
    /// Final value in the public session ("valor_final_sessao").
    pub session_final: Option<Decimal>,
    /// Negotiated value ("valor_negociado").
    pub negotiated: Option<Decimal>,
    /// Awarded value ("valor_arrematado").
    pub awarded: Option<Decimal>,
}

impl ValueObject for CandidateValues {}

impl CandidateValues {
    /// Unit value used for the awarded total.
    ///
    /// Priority: awarded → negotiated → session-final → estimated → zero. A zero
    /// candidate counts as missing.
    pub fn award_unit_value(&self) -> Decimal {
        [self.awarded, self.negotiated, self.session_final, self.estimated]
            .into_iter()
            .flatten()
            .find(|v| !v.is_zero())
            .unwrap_or(Decimal::ZERO)
    }
}

/// Derived financial figures of an item.
///
/// Written only by the valuation engine; every other caller reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFinancials {
    #[serde(rename = "valor_vencido")]
    pub awarded_value: Decimal,
    #[serde(rename = "valor_empenhado")]
    pub committed_value: Decimal,
    #[serde(rename = "valor_faturado")]
    pub invoiced_value: Decimal,
    #[serde(rename = "valor_pago")]
    pub received_value: Decimal,
    #[serde(rename = "saldo_aberto")]
    pub outstanding_balance: Decimal,
    #[serde(rename = "lucro_bruto")]
    pub gross_profit: Decimal,
    #[serde(rename = "lucro_liquido")]
    pub net_profit: Decimal,
}

impl ValueObject for ItemFinancials {}

/// Entity: one line item of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessItem {
    id: ProcessItemId,
    process_id: ProcessId,
    company_id: CompanyId,
    number: u32,
    description: String,
    quantity: Decimal,
    unit: String,
    candidates: CandidateValues,
    status: ItemStatus,
    final_situation: Option<FinalSituation>,
    financials: ItemFinancials,
}

impl ProcessItem {
    pub fn new(
        id: ProcessItemId,
        process_id: ProcessId,
        company_id: CompanyId,
        number: u32,
        description: impl Into<String>,
        quantity: Decimal,
        unit: impl Into<String>,
    ) -> DomainResult<Self> {
        if quantity.is_sign_negative() || quantity.is_zero() {
            return Err(DomainError::validation("item quantity must be positive"));
        }

        Ok(Self {
            id,
            process_id,
            company_id,
            number,
            description: description.into(),
            quantity,
            unit: unit.into(),
            candidates: CandidateValues::default(),
            status: ItemStatus::Pending,
            final_situation: None,
            financials: ItemFinancials::default(),
        })
    }

    pub fn with_candidates(mut self, candidates: CandidateValues) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn id_typed(&self) -> ProcessItemId {
        self.id
    }

    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn candidates(&self) -> &CandidateValues {
        &self.candidates
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn final_situation(&self) -> Option<FinalSituation> {
        self.final_situation
    }

    pub fn financials(&self) -> &ItemFinancials {
        &self.financials
    }

    /// `isVencido`: won at judging, or currently accepted.
    pub fn is_won(&self) -> bool {
        self.final_situation == Some(FinalSituation::Won) || self.status.is_accepted()
    }

    pub fn set_candidates(&mut self, candidates: CandidateValues) {
        self.candidates = candidates;
    }

    /// Change the judging/fulfillment status.
    ///
    /// Fulfillment stages (awaiting delivery, in execution) are only reachable by a
    /// won item.
    pub fn set_status(&mut self, status: ItemStatus) -> DomainResult<()> {
        if status.is_fulfillment_stage() && !self.is_won() && !self.status.is_fulfillment_stage()
        {
            return Err(DomainError::invariant(format!(
                "item {} was not won and cannot move to {status}",
                self.number
            )));
        }
        self.status = status;
        Ok(())
    }

    /// Fix `situacao_final` from the current status once judging is over.
    pub fn conclude_judging(&mut self) -> DomainResult<FinalSituation> {
        let situation = match self.status {
            ItemStatus::Pending => {
                return Err(DomainError::validation(format!(
                    "item {} is still pending judgement",
                    self.number
                )));
            }
            ItemStatus::Accepted
            | ItemStatus::AcceptedQualified
            | ItemStatus::AwaitingDelivery
            | ItemStatus::InExecution => FinalSituation::Won,
            ItemStatus::Declassified | ItemStatus::Disqualified => FinalSituation::Lost,
        };
        self.final_situation = Some(situation);
        Ok(situation)
    }

    /// Replace the derived figures with a freshly computed set.
    pub fn record_financials(&mut self, financials: ItemFinancials) {
        self.financials = financials;
    }
}

impl Entity for ProcessItem {
    type Id = ProcessItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
