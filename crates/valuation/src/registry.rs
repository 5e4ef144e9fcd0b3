//! Linkage registry: read projection of item → instrument associations.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use licitacao_core::sum_money;
use licitacao_fulfillment::{InstrumentKind, InstrumentRef, Linkage};
use licitacao_processes::{ProcessItem, ProcessItemId};

/// Result of checking whether an item can take another linked slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityCheck {
    pub item_quantity: Decimal,
    pub already_linked: Decimal,
    pub requested: Decimal,
    /// How much the new total would exceed the item quantity (zero if it fits).
    pub overflow: Decimal,
}

impl CapacityCheck {
    pub fn fits(&self) -> bool {
        self.overflow.is_zero()
    }
}

/// Linkages of a set of items, in the order they were supplied.
#[derive(Debug, Clone)]
pub struct LinkageRegistry<'a> {
    linkages: &'a [Linkage],
}

impl<'a> LinkageRegistry<'a> {
    pub fn new(linkages: &'a [Linkage]) -> Self {
        Self { linkages }
    }

    /// `linksFor(item)`: every linkage of the item.
    pub fn links_for(&self, item_id: ProcessItemId) -> Vec<&'a Linkage> {
        self.linkages
            .iter()
            .filter(|l| l.item_id() == item_id)
            .collect()
    }

    /// Linkages of the item targeting one instrument kind.
    pub fn links_of_kind(&self, item_id: ProcessItemId, kind: InstrumentKind) -> Vec<&'a Linkage> {
        self.linkages
            .iter()
            .filter(|l| l.item_id() == item_id && l.kind() == kind)
            .collect()
    }

    /// Distinct instruments the item is linked to.
    pub fn instruments_for(&self, item_id: ProcessItemId) -> BTreeSet<InstrumentRef> {
        self.linkages
            .iter()
            .filter(|l| l.item_id() == item_id)
            .map(Linkage::instrument)
            .collect()
    }

    /// Sum of linkage totals targeting purchase commitments.
    pub fn committed_total(&self, item_id: ProcessItemId) -> Decimal {
        sum_money(
            self.links_of_kind(item_id, InstrumentKind::PurchaseCommitment)
                .into_iter()
                .map(Linkage::total_value),
        )
    }

    pub fn linked_quantity(&self, item_id: ProcessItemId) -> Decimal {
        sum_money(self.links_for(item_id).into_iter().map(Linkage::quantity))
    }

    /// `quantidade_disponivel`: item quantity not yet sliced into a linkage.
    ///
    /// Negative when linkages overflow the item.
    pub fn available_quantity(&self, item: &ProcessItem) -> Decimal {
        item.quantity() - self.linked_quantity(item.id_typed())
    }

    /// Would linking `requested` more units overflow the item?
    pub fn capacity_check(&self, item: &ProcessItem, requested: Decimal) -> CapacityCheck {
        let already_linked = self.linked_quantity(item.id_typed());
        let excess = sum_money([already_linked, requested]) - item.quantity();
        CapacityCheck {
            item_quantity: item.quantity(),
            already_linked,
            requested,
            overflow: excess.max(Decimal::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::World;
    use licitacao_processes::ItemStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn links_for_keeps_supplied_order_and_ignores_other_items() {
        let world = World::new();
        let item = world.item(1, dec!(10), ItemStatus::Accepted);
        let other = world.item(2, dec!(5), ItemStatus::Accepted);
        let contract = world.contract(dec!(100)).reference();
        let commitment = world.commitment(dec!(40)).reference();

        let linkages = vec![
            world.linkage(&item, contract, dec!(6), dec!(60)),
            world.linkage(&other, contract, dec!(5), dec!(50)),
            world.linkage(&item, commitment, dec!(4), dec!(40)),
        ];
        let registry = LinkageRegistry::new(&linkages);

        let links = registry.links_for(item.id_typed());
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].instrument(), contract);
        assert_eq!(links[1].instrument(), commitment);
        assert_eq!(registry.committed_total(item.id_typed()), dec!(40));
        assert_eq!(registry.available_quantity(&item), Decimal::ZERO);
    }

    #[test]
    fn item_without_linkages_has_everything_available() {
        let world = World::new();
        let item = world.item(1, dec!(10), ItemStatus::Accepted);
        let registry = LinkageRegistry::new(&[]);

        assert!(registry.links_for(item.id_typed()).is_empty());
        assert_eq!(registry.committed_total(item.id_typed()), Decimal::ZERO);
        assert_eq!(registry.available_quantity(&item), dec!(10));
    }

    #[test]
    fn capacity_check_reports_overflow() {
        let world = World::new();
        let item = world.item(1, dec!(10), ItemStatus::Accepted);
        let contract = world.contract(dec!(100)).reference();
        let linkages = vec![world.linkage(&item, contract, dec!(8), dec!(80))];
        let registry = LinkageRegistry::new(&linkages);

        assert!(registry.capacity_check(&item, dec!(2)).fits());
        let check = registry.capacity_check(&item, dec!(3.5));
        assert!(!check.fits());
        assert_eq!(check.overflow, dec!(1.5));
        assert_eq!(check.already_linked, dec!(8));
    }

    #[test]
    fn instruments_are_deduplicated() {
        let world = World::new();
        let item = world.item(1, dec!(10), ItemStatus::Accepted);
        let af = world.supply_authorization(dec!(100)).reference();
        let linkages = vec![
            world.linkage(&item, af, dec!(2), dec!(20)),
            world.linkage(&item, af, dec!(3), dec!(30)),
        ];
        let registry = LinkageRegistry::new(&linkages);

        assert_eq!(registry.instruments_for(item.id_typed()).len(), 1);
        assert_eq!(registry.linked_quantity(item.id_typed()), dec!(5));
    }
}
