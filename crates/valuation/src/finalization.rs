//! Closing eligibility of a process.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use licitacao_processes::{ProcessItem, ProcessItemId};

use crate::item::ItemValuation;
use crate::registry::LinkageRegistry;

/// A won item that still has quantity not assigned to any instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingItem {
    pub item_id: ProcessItemId,
    pub number: u32,
    pub available_quantity: Decimal,
}

/// `podeSerFinalizado`: every won item must be fully sliced into linkages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalizationCheck {
    pub blocking: Vec<BlockingItem>,
}

impl FinalizationCheck {
    pub fn evaluate(items: &[ProcessItem], registry: &LinkageRegistry<'_>) -> Self {
        let blocking = items
            .iter()
            .filter(|item| item.is_won())
            .filter_map(|item| {
                let available_quantity = registry.available_quantity(item);
                (available_quantity > Decimal::ZERO).then(|| BlockingItem {
                    item_id: item.id_typed(),
                    number: item.number(),
                    available_quantity,
                })
            })
            .collect();
        Self { blocking }
    }

    pub fn can_finalize(&self) -> bool {
        self.blocking.is_empty()
    }

    /// Human readable reason when finalization is refused.
    pub fn reason(&self) -> Option<String> {
        if self.can_finalize() {
            return None;
        }
        let numbers: Vec<String> = self.blocking.iter().map(|b| b.number.to_string()).collect();
        Some(format!(
            "items with undelivered quantity: {}",
            numbers.join(", ")
        ))
    }
}

/// Whether a payment confirmation settles the process.
///
/// Looks at items with status accepted or accepted-qualified only; their
/// invoice-reconciled outstanding balance must be zero or less. Vacuously true
/// when there is no such item. Items missing from `valuations` count as settled.
pub fn settled_for_closing(
    items: &[ProcessItem],
    valuations: &BTreeMap<ProcessItemId, ItemValuation>,
) -> bool {
    items
        .iter()
        .filter(|item| item.status().is_accepted())
        .filter_map(|item| valuations.get(&item.id_typed()))
        .all(|v| v.reconciled_outstanding <= Decimal::ZERO)
}
