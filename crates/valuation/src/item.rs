//! Item valuation: derived financial figures of one process item.
//!
//! The engine is a pure function over an [`ItemSnapshot`]. It never fails:
//! missing candidate values, quotations, linkages or invoices all degrade to
//! zero. Persisting the result is the caller's job.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use licitacao_core::{mul_money, round_money};
use licitacao_fulfillment::{
    Invoice, InvoiceDirection, Linkage, Quotation, Settlement, SettlementFilter, chosen_quotation,
};
use licitacao_processes::{ItemFinancials, ProcessItem, ProcessItemId};

use crate::ledger::InvoiceLedgerView;
use crate::registry::LinkageRegistry;

/// Everything the valuation of one item depends on.
///
/// `linkages` and `invoices` may cover the whole process; only the ones
/// reachable from `item` are used.
#[derive(Debug, Clone, Copy)]
pub struct ItemSnapshot<'a> {
    pub item: &'a ProcessItem,
    /// Payment-received date of the parent process.
    pub payment_received_on: Option<NaiveDate>,
    pub linkages: &'a [Linkage],
    pub invoices: &'a [Invoice],
    /// Chosen quotation of the item, if any.
    pub quotation: Option<&'a Quotation>,
}

/// Output of one item valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemValuation {
    pub item_id: ProcessItemId,
    pub financials: ItemFinancials,
    /// `custo_total` used for the profit figures.
    pub direct_cost: Decimal,
    /// Billed outgoing invoices minus the ones already paid. Ignores both the
    /// payment-confirmation override and the lift to the committed value, so
    /// it is what the issued invoices still leave unpaid.
    pub reconciled_outstanding: Decimal,
    /// `quantidade_disponivel`.
    pub available_quantity: Decimal,
}

impl ItemValuation {
    /// Write the derived figures back into the item.
    pub fn apply_to(&self, item: &mut ProcessItem) {
        item.record_financials(self.financials.clone());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ItemValuationEngine;

impl ItemValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Value a single item.
    pub fn value(&self, snapshot: &ItemSnapshot<'_>) -> ItemValuation {
        let registry = LinkageRegistry::new(snapshot.linkages);
        let ledger = InvoiceLedgerView::new(&registry, snapshot.invoices);
        let quotation = snapshot
            .quotation
            .filter(|q| q.chosen_supplier && q.item_id == snapshot.item.id_typed());
        compute(
            snapshot.item,
            snapshot.payment_received_on,
            &registry,
            &ledger,
            quotation,
        )
    }

    /// Value every item of a process.
    ///
    /// Each item depends only on its own linkages, invoices and quotation, so
    /// the result does not depend on the order of `items`.
    pub fn value_all(
        &self,
        items: &[ProcessItem],
        payment_received_on: Option<NaiveDate>,
        linkages: &[Linkage],
        invoices: &[Invoice],
        quotations: &[Quotation],
    ) -> BTreeMap<ProcessItemId, ItemValuation> {
        let registry = LinkageRegistry::new(linkages);
        let ledger = InvoiceLedgerView::new(&registry, invoices);

        items
            .iter()
            .map(|item| {
                let item_id = item.id_typed();
                let quotation =
                    chosen_quotation(quotations.iter().filter(|q| q.item_id == item_id));
                let valuation = compute(item, payment_received_on, &registry, &ledger, quotation);
                (item_id, valuation)
            })
            .collect()
    }
}

fn compute(
    item: &ProcessItem,
    payment_received_on: Option<NaiveDate>,
    registry: &LinkageRegistry<'_>,
    ledger: &InvoiceLedgerView<'_>,
    quotation: Option<&Quotation>,
) -> ItemValuation {
    let item_id = item.id_typed();
    let payment_confirmed = payment_received_on.is_some();

    let awarded_value = if item.is_won() {
        round_money(mul_money(item.candidates().award_unit_value(), item.quantity()))
    } else {
        Decimal::ZERO
    };

    let committed_value = round_money(registry.committed_total(item_id));

    let billed = round_money(ledger.invoices_for(
        item_id,
        InvoiceDirection::Saida,
        SettlementFilter::Any,
    ));
    // Processes paid before invoices were tracked only carry commitments.
    let invoiced_value = if payment_confirmed && billed < committed_value {
        committed_value
    } else {
        billed
    };

    let paid_invoices = round_money(ledger.invoices_for(
        item_id,
        InvoiceDirection::Saida,
        SettlementFilter::Only(Settlement::Paga),
    ));
    let received_value = if payment_confirmed && paid_invoices < invoiced_value {
        invoiced_value
    } else {
        paid_invoices
    };

    let direct_cost = quotation
        .map(|q| round_money(q.total_cost(item.quantity())))
        .unwrap_or(Decimal::ZERO);
    let gross_profit = round_money(invoiced_value - direct_cost);

    ItemValuation {
        item_id,
        financials: ItemFinancials {
            awarded_value,
            committed_value,
            invoiced_value,
            received_value,
            outstanding_balance: round_money(invoiced_value - received_value),
            gross_profit,
            net_profit: gross_profit,
        },
        direct_cost,
        reconciled_outstanding: round_money(billed - paid_invoices),
        available_quantity: registry.available_quantity(item),
    }
}
