//! Invoice ledger view: invoice sums reachable through an item's linkages.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use licitacao_core::sum_money;
use licitacao_fulfillment::{InstrumentRef, Invoice, InvoiceDirection, SettlementFilter};
use licitacao_processes::ProcessItemId;

use crate::registry::LinkageRegistry;

/// Read-only view over invoices, indexed by the instrument they bill.
///
/// Invoices without an instrument are never reachable from an item.
#[derive(Debug, Clone)]
pub struct InvoiceLedgerView<'a> {
    registry: &'a LinkageRegistry<'a>,
    by_instrument: BTreeMap<InstrumentRef, Vec<&'a Invoice>>,
}

impl<'a> InvoiceLedgerView<'a> {
    pub fn new(registry: &'a LinkageRegistry<'a>, invoices: &'a [Invoice]) -> Self {
        let mut by_instrument: BTreeMap<InstrumentRef, Vec<&'a Invoice>> = BTreeMap::new();
        for invoice in invoices {
            if let Some(instrument) = invoice.instrument() {
                by_instrument.entry(instrument).or_default().push(invoice);
            }
        }
        Self {
            registry,
            by_instrument,
        }
    }

    /// Invoices attached to one instrument.
    pub fn invoices_of(&self, instrument: InstrumentRef) -> &[&'a Invoice] {
        self.by_instrument
            .get(&instrument)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `invoicesFor(item, direction, settlementFilter)`.
    ///
    /// Each instrument is counted once even if the item has several linkages to it.
    pub fn invoices_for(
        &self,
        item_id: ProcessItemId,
        direction: InvoiceDirection,
        filter: SettlementFilter,
    ) -> Decimal {
        sum_money(
            self.registry
                .instruments_for(item_id)
                .into_iter()
                .flat_map(|instrument| self.invoices_of(instrument).iter())
                .filter(|invoice| invoice.matches(direction, filter))
                .map(|invoice| invoice.value()),
        )
    }
}
