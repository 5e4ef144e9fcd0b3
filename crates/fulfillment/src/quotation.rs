use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use licitacao_core::{CompanyId, DomainError, DomainResult, mul_money, sum_money, typed_id};
use licitacao_processes::ProcessItemId;

typed_id!(
    /// Supplier quotation ("orçamento") identifier.
    QuotationId
);

/// A supplier quotation for one process item.
///
/// The quotation flagged `chosen_supplier` ("fornecedor_escolhido") feeds the
/// direct cost used by the profit figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    pub company_id: CompanyId,
    pub item_id: ProcessItemId,
    pub supplier: String,
    /// Unit product cost ("custo_produto").
    pub product_cost: Decimal,
    /// Unit freight ("frete").
    pub freight: Decimal,
    /// Freight already included in the product cost ("frete_incluido").
    pub freight_included: bool,
    pub chosen_supplier: bool,
}

impl Quotation {
    pub fn validate(&self) -> DomainResult<()> {
        if self.product_cost.is_sign_negative() || self.freight.is_sign_negative() {
            return Err(DomainError::validation("quotation costs cannot be negative"));
        }
        Ok(())
    }

    /// Unit cost: product plus freight unless freight is already included.
    pub fn unit_cost(&self) -> Decimal {
        if self.freight_included {
            self.product_cost
        } else {
            sum_money([self.product_cost, self.freight])
        }
    }

    /// Direct cost for `quantity` units ("custo_total").
    pub fn total_cost(&self, quantity: Decimal) -> Decimal {
        mul_money(self.unit_cost(), quantity)
    }
}

/// The chosen quotation among `quotations`, if any.
///
/// If several are flagged, the first one wins.
pub fn chosen<'a, I>(quotations: I) -> Option<&'a Quotation>
where
    I: IntoIterator<Item = &'a Quotation>,
{
    quotations.into_iter().find(|q| q.chosen_supplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quotation(chosen_supplier: bool, freight_included: bool) -> Quotation {
        Quotation {
            id: QuotationId::generate(),
            company_id: CompanyId::new(),
            item_id: ProcessItemId::generate(),
            supplier: "Distribuidora Paulista".to_string(),
            product_cost: dec!(3.50),
            freight: dec!(0.25),
            freight_included,
            chosen_supplier,
        }
    }

    #[test]
    fn freight_is_added_unless_included() {
        assert_eq!(quotation(true, false).total_cost(dec!(10)), dec!(37.50));
        assert_eq!(quotation(true, true).total_cost(dec!(10)), dec!(35.00));
    }

    #[test]
    fn chosen_picks_the_flagged_quotation() {
        let list = vec![quotation(false, false), quotation(true, true)];
        let picked = chosen(&list).unwrap();
        assert!(picked.freight_included);
        assert!(chosen(&list[..1]).is_none());
    }
}
