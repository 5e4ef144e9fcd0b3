//! Builders shared by the unit tests of this crate.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use licitacao_core::CompanyId;
use licitacao_fulfillment::{
    ContractId, Instrument, InstrumentHeader, InstrumentRef, Invoice, InvoiceDirection, InvoiceId,
    Linkage, LinkageId, PurchaseCommitmentId, Quotation, QuotationId, Settlement,
    SupplyAuthorizationId,
};
use licitacao_processes::{CandidateValues, ItemStatus, ProcessId, ProcessItem, ProcessItemId};

pub struct World {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
}

impl World {
    pub fn new() -> Self {
        Self {
            company_id: CompanyId::new(),
            process_id: ProcessId::generate(),
        }
    }

    pub fn item(&self, number: u32, quantity: Decimal, status: ItemStatus) -> ProcessItem {
        let mut item = ProcessItem::new(
            ProcessItemId::generate(),
            self.process_id,
            self.company_id,
            number,
            format!("item {number}"),
            quantity,
            "UN",
        )
        .unwrap();
        if status.is_pending_fulfillment() && !status.is_accepted() {
            item.set_status(ItemStatus::Accepted).unwrap();
        }
        item.set_status(status).unwrap();
        item
    }

    pub fn won_item(&self, quantity: Decimal, candidates: CandidateValues) -> ProcessItem {
        self.item(1, quantity, ItemStatus::Accepted)
            .with_candidates(candidates)
    }

    pub fn linkage(&self, item: &ProcessItem, instrument: InstrumentRef, quantity: Decimal, total: Decimal) -> Linkage {
        Linkage::new(
            LinkageId::generate(),
            self.company_id,
            self.process_id,
            item.id_typed(),
            instrument,
            quantity,
            Decimal::ZERO,
            Some(total),
        )
        .unwrap()
    }

    pub fn invoice(
        &self,
        instrument: InstrumentRef,
        direction: InvoiceDirection,
        settlement: Settlement,
        value: Decimal,
    ) -> Invoice {
        Invoice::new(
            InvoiceId::generate(),
            self.company_id,
            "NF-1",
            direction,
            settlement,
            value,
        )
        .unwrap()
        .attached_to(instrument)
    }

    pub fn quotation(&self, item: &ProcessItem, product_cost: Decimal, freight: Decimal) -> Quotation {
        Quotation {
            id: QuotationId::generate(),
            company_id: self.company_id,
            item_id: item.id_typed(),
            supplier: "Fornecedor".to_string(),
            product_cost,
            freight,
            freight_included: false,
            chosen_supplier: true,
        }
    }

    fn header(&self, total: Decimal) -> InstrumentHeader {
        InstrumentHeader {
            company_id: self.company_id,
            process_id: self.process_id,
            number: "001/2024".to_string(),
            total_value: total,
            issued_on: NaiveDate::from_ymd_opt(2024, 4, 1),
        }
    }

    pub fn contract(&self, total: Decimal) -> Instrument {
        Instrument::contract(ContractId::generate(), self.header(total)).unwrap()
    }

    pub fn supply_authorization(&self, total: Decimal) -> Instrument {
        Instrument::supply_authorization(SupplyAuthorizationId::generate(), self.header(total))
            .unwrap()
    }

    pub fn commitment(&self, total: Decimal) -> Instrument {
        Instrument::purchase_commitment(PurchaseCommitmentId::generate(), self.header(total))
            .unwrap()
    }
}

pub fn payment_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}
