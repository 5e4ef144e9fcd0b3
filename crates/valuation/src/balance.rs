//! Process-level balance rollups.
//!
//! Read-only: aggregates the persisted derived figures of the items together
//! with the instruments linked to the process.

use rust_decimal::Decimal;
use serde::Serialize;

use licitacao_core::{round_money, sum_money};
use licitacao_fulfillment::{Instrument, InstrumentKind};
use licitacao_processes::{ProcessId, ProcessItem};

/// Awarded value of items still waiting to be fulfilled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AwardedBalance {
    pub total: Decimal,
    pub item_count: usize,
}

/// Contracts and supply authorizations of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoundBalance {
    pub contracts_total: Decimal,
    pub contract_count: usize,
    pub supply_authorizations_total: Decimal,
    pub supply_authorization_count: usize,
    pub total: Decimal,
}

/// Purchase commitments ("empenhos") of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommittedBalance {
    pub total: Decimal,
    pub count: usize,
}

/// Awarded value not yet covered by a contract or supply authorization.
///
/// Negative when instruments exceed the awarded value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnboundBalance {
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceSummary {
    pub awarded_total: Decimal,
    pub bound_total: Decimal,
    pub committed_total: Decimal,
    pub unbound_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessBalances {
    pub process_id: ProcessId,
    #[serde(rename = "saldo_vencido")]
    pub awarded: AwardedBalance,
    #[serde(rename = "saldo_vinculado")]
    pub bound: BoundBalance,
    #[serde(rename = "saldo_empenhado")]
    pub committed: CommittedBalance,
    #[serde(rename = "saldo_nao_vinculado")]
    pub unbound: UnboundBalance,
    #[serde(rename = "resumo")]
    pub summary: BalanceSummary,
}

#[derive(Debug, Clone, Copy)]
pub struct BalanceAggregator {
    process_id: ProcessId,
}

impl BalanceAggregator {
    pub fn for_process(process_id: ProcessId) -> Self {
        Self { process_id }
    }

    /// Roll up `items` and `instruments`. Entries of other processes are ignored.
    pub fn aggregate(&self, items: &[ProcessItem], instruments: &[Instrument]) -> ProcessBalances {
        let awarded = self.awarded(items);
        let bound = self.bound(instruments);
        let committed = self.committed(instruments);
        let unbound = UnboundBalance {
            total: round_money(awarded.total - bound.total),
        };

        let summary = BalanceSummary {
            awarded_total: awarded.total,
            bound_total: bound.total,
            committed_total: committed.total,
            unbound_total: unbound.total,
        };

        ProcessBalances {
            process_id: self.process_id,
            awarded,
            bound,
            committed,
            unbound,
            summary,
        }
    }

    fn awarded(&self, items: &[ProcessItem]) -> AwardedBalance {
        let pending: Vec<&ProcessItem> = items
            .iter()
            .filter(|i| i.process_id() == self.process_id && i.status().is_pending_fulfillment())
            .collect();
        AwardedBalance {
            total: round_money(sum_money(
                pending.iter().map(|i| i.financials().awarded_value),
            )),
            item_count: pending.len(),
        }
    }

    fn of_kind<'a>(
        &self,
        instruments: &'a [Instrument],
        kind: InstrumentKind,
    ) -> (Decimal, usize) {
        let matching: Vec<&'a Instrument> = instruments
            .iter()
            .filter(|i| i.process_id() == self.process_id && i.kind() == kind)
            .collect();
        (
            round_money(sum_money(matching.iter().map(|i| i.total_value()))),
            matching.len(),
        )
    }

    fn bound(&self, instruments: &[Instrument]) -> BoundBalance {
        let (contracts_total, contract_count) = self.of_kind(instruments, InstrumentKind::Contract);
        let (supply_authorizations_total, supply_authorization_count) =
            self.of_kind(instruments, InstrumentKind::SupplyAuthorization);
        BoundBalance {
            contracts_total,
            contract_count,
            supply_authorizations_total,
            supply_authorization_count,
            total: sum_money([contracts_total, supply_authorizations_total]),
        }
    }

    fn committed(&self, instruments: &[Instrument]) -> CommittedBalance {
        let (total, count) = self.of_kind(instruments, InstrumentKind::PurchaseCommitment);
        CommittedBalance { total, count }
    }
}
