//! Default status-transition policy for `perdido` and `arquivado`.

use rust_decimal::Decimal;

use licitacao_processes::{Process, ProcessItem, ProcessStatus, ProcessTransition};

use crate::ports::{PolicyDecision, StatusTransitionPolicy};

/// Refuses moves that would hide money still in flight.
///
/// - Lost: refused once any item has invoiced revenue.
/// - Archive: refused while in execution or payment with an open balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStatusPolicy;

impl StatusTransitionPolicy for DefaultStatusPolicy {
    fn evaluate(
        &self,
        process: &Process,
        items: &[ProcessItem],
        transition: ProcessTransition,
    ) -> PolicyDecision {
        match transition {
            ProcessTransition::MarkLost => {
                if items
                    .iter()
                    .any(|i| i.financials().invoiced_value > Decimal::ZERO)
                {
                    return PolicyDecision::deny(
                        "processo possui itens faturados e não pode ser marcado como perdido",
                    );
                }
                PolicyDecision::allow()
            }
            ProcessTransition::Archive => {
                let in_flight = process.is_in_execution() || process.status() == ProcessStatus::Payment;
                if in_flight
                    && items
                        .iter()
                        .any(|i| i.financials().outstanding_balance > Decimal::ZERO)
                {
                    return PolicyDecision::deny(
                        "processo possui saldo em aberto e não pode ser arquivado",
                    );
                }
                PolicyDecision::allow()
            }
            _ => PolicyDecision::allow(),
        }
    }
}
