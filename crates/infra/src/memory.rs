//! In-memory collaborators for tests and local runs.

use std::sync::Arc;

use tracing::{debug, warn};

use licitacao_core::{AggregateRoot, CompanyId, DomainError, ExpectedVersion, sum_money};
use licitacao_fulfillment::{
    Instrument, InstrumentRef, Invoice, InvoiceId, Linkage, LinkageId, Quotation, QuotationId,
    chosen_quotation,
};
use licitacao_processes::{Process, ProcessId, ProcessItem, ProcessItemId};
use licitacao_valuation::{CapacityCheck, LinkageRegistry};

use crate::config::EngineConfig;
use crate::error::{LifecycleError, StoreError};
use crate::ports::{
    InstrumentProvider, InvoiceProvider, ItemRepository, LinkageProvider, ProcessRepository,
    QuotationProvider,
};
use crate::store::{CompanyStore, InMemoryCompanyStore};

fn owner(process: &Process) -> Result<CompanyId, StoreError> {
    process.company_id().ok_or(StoreError::CompanyIsolation)
}

#[derive(Debug, Default)]
pub struct InMemoryProcessRepository {
    store: InMemoryCompanyStore<ProcessId, Process>,
}

impl InMemoryProcessRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessRepository for InMemoryProcessRepository {
    fn find(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> Result<Option<Process>, StoreError> {
        Ok(self.store.get(company_id, &process_id))
    }

    fn save(&self, process: Process, expected: ExpectedVersion) -> Result<Process, StoreError> {
        let company_id = owner(&process)?;
        let process_id = process.id_typed();
        let stored_version = self
            .store
            .get(company_id, &process_id)
            .map(|p| p.version())
            .unwrap_or(0);
        if !expected.matches(stored_version) {
            return Err(StoreError::Conflict(format!(
                "process {process_id} is at version {stored_version}, expected {expected:?}"
            )));
        }
        self.store.upsert(company_id, process_id, process.clone());
        Ok(process)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    store: InMemoryCompanyStore<ProcessItemId, ProcessItem>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemRepository for InMemoryItemRepository {
    fn find(
        &self,
        company_id: CompanyId,
        item_id: ProcessItemId,
    ) -> Result<Option<ProcessItem>, StoreError> {
        Ok(self.store.get(company_id, &item_id))
    }

    fn list_for_process(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> Result<Vec<ProcessItem>, StoreError> {
        let mut items: Vec<ProcessItem> = self
            .store
            .list(company_id)
            .into_iter()
            .filter(|i| i.process_id() == process_id)
            .collect();
        items.sort_by_key(|i| i.number());
        Ok(items)
    }

    fn save(&self, item: ProcessItem) -> Result<ProcessItem, StoreError> {
        self.store
            .upsert(item.company_id(), item.id_typed(), item.clone());
        Ok(item)
    }

    fn save_all(&self, items: Vec<ProcessItem>) -> Result<(), StoreError> {
        for item in items {
            self.store.upsert(item.company_id(), item.id_typed(), item);
        }
        Ok(())
    }
}

/// Linkage store that checks item capacity on registration.
#[derive(Debug)]
pub struct InMemoryLinkageStore {
    store: InMemoryCompanyStore<LinkageId, Linkage>,
    strict_quantity: bool,
}

impl InMemoryLinkageStore {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            store: InMemoryCompanyStore::new(),
            strict_quantity: config.strict_linkage_quantity,
        }
    }

    /// Register a linkage of `item`.
    ///
    /// Overflowing the item quantity is refused in strict mode and logged otherwise.
    pub fn register(
        &self,
        item: &ProcessItem,
        linkage: Linkage,
    ) -> Result<CapacityCheck, LifecycleError> {
        if linkage.item_id() != item.id_typed() || linkage.company_id() != item.company_id() {
            return Err(LifecycleError::NotFound);
        }

        let existing = self.linkages_for_item(item.company_id(), item.id_typed())?;
        let check = LinkageRegistry::new(&existing).capacity_check(item, linkage.quantity());
        if !check.fits() {
            if self.strict_quantity {
                return Err(DomainError::invariant(format!(
                    "linked quantity {} exceeds item {} quantity {}",
                    sum_money([check.already_linked, check.requested]),
                    item.number(),
                    check.item_quantity
                ))
                .into());
            }
            warn!(
                item = %item.id_typed(),
                overflow = %check.overflow,
                "linkage exceeds item quantity"
            );
        }

        debug!(linkage = %linkage.id_typed(), instrument = %linkage.instrument(), "linkage registered");
        self.store
            .upsert(linkage.company_id(), linkage.id_typed(), linkage);
        Ok(check)
    }

    pub fn remove(&self, company_id: CompanyId, linkage_id: LinkageId) -> Option<Linkage> {
        self.store.remove(company_id, &linkage_id)
    }
}

impl LinkageProvider for InMemoryLinkageStore {
    fn linkages_for_item(
        &self,
        company_id: CompanyId,
        item_id: ProcessItemId,
    ) -> Result<Vec<Linkage>, StoreError> {
        Ok(self
            .store
            .list(company_id)
            .into_iter()
            .filter(|l| l.item_id() == item_id)
            .collect())
    }

    fn linkages_for_process(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> Result<Vec<Linkage>, StoreError> {
        Ok(self
            .store
            .list(company_id)
            .into_iter()
            .filter(|l| l.process_id() == process_id)
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    store: InMemoryCompanyStore<InvoiceId, Invoice>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, invoice: Invoice) {
        self.store
            .upsert(invoice.company_id(), invoice.id_typed(), invoice);
    }
}

impl InvoiceProvider for InMemoryInvoiceStore {
    fn invoices_for_instrument(
        &self,
        company_id: CompanyId,
        instrument: InstrumentRef,
    ) -> Result<Vec<Invoice>, StoreError> {
        Ok(self
            .store
            .list(company_id)
            .into_iter()
            .filter(|i| i.instrument() == Some(instrument))
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryQuotationStore {
    store: InMemoryCompanyStore<QuotationId, Quotation>,
}

impl InMemoryQuotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, quotation: Quotation) -> Result<(), LifecycleError> {
        quotation.validate()?;
        self.store
            .upsert(quotation.company_id, quotation.id, quotation);
        Ok(())
    }
}

impl QuotationProvider for InMemoryQuotationStore {
    fn chosen_for(
        &self,
        company_id: CompanyId,
        item_id: ProcessItemId,
    ) -> Result<Option<Quotation>, StoreError> {
        let mut quotations: Vec<Quotation> = self
            .store
            .list(company_id)
            .into_iter()
            .filter(|q| q.item_id == item_id)
            .collect();
        quotations.sort_by_key(|q| q.id);
        Ok(chosen_quotation(&quotations).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryInstrumentStore {
    store: InMemoryCompanyStore<InstrumentRef, Instrument>,
}

impl InMemoryInstrumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, instrument: Instrument) {
        self.store
            .upsert(instrument.company_id(), instrument.reference(), instrument);
    }
}

impl InstrumentProvider for InMemoryInstrumentStore {
    fn instruments_for_process(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> Result<Vec<Instrument>, StoreError> {
        let mut instruments: Vec<Instrument> = self
            .store
            .list(company_id)
            .into_iter()
            .filter(|i| i.process_id() == process_id)
            .collect();
        instruments.sort_by_key(|i| i.reference());
        Ok(instruments)
    }
}

/// Every in-memory collaborator, shared behind `Arc`s.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    pub processes: Arc<InMemoryProcessRepository>,
    pub items: Arc<InMemoryItemRepository>,
    pub linkages: Arc<InMemoryLinkageStore>,
    pub invoices: Arc<InMemoryInvoiceStore>,
    pub quotations: Arc<InMemoryQuotationStore>,
    pub instruments: Arc<InMemoryInstrumentStore>,
}

impl InMemoryBackend {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            processes: Arc::new(InMemoryProcessRepository::new()),
            items: Arc::new(InMemoryItemRepository::new()),
            linkages: Arc::new(InMemoryLinkageStore::new(config)),
            invoices: Arc::new(InMemoryInvoiceStore::new()),
            quotations: Arc::new(InMemoryQuotationStore::new()),
            instruments: Arc::new(InMemoryInstrumentStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use licitacao_fulfillment::{ContractId, InstrumentHeader};
    use licitacao_processes::ItemStatus;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn item(company_id: CompanyId, process_id: ProcessId, number: u32) -> ProcessItem {
        let mut item = ProcessItem::new(
            ProcessItemId::generate(),
            process_id,
            company_id,
            number,
            "Seringa 10ml",
            dec!(10),
            "CX",
        )
        .unwrap();
        item.set_status(ItemStatus::Accepted).unwrap();
        item
    }

    fn linkage(item: &ProcessItem, quantity: Decimal) -> Linkage {
        Linkage::new(
            LinkageId::generate(),
            item.company_id(),
            item.process_id(),
            item.id_typed(),
            InstrumentRef::Contract(ContractId::generate()),
            quantity,
            dec!(2),
            None,
        )
        .unwrap()
    }

    #[test]
    fn lenient_store_accepts_overflow() {
        let store = InMemoryLinkageStore::new(&EngineConfig::default());
        let item = item(CompanyId::new(), ProcessId::generate(), 1);

        assert!(store.register(&item, linkage(&item, dec!(8))).unwrap().fits());
        let check = store.register(&item, linkage(&item, dec!(4))).unwrap();
        assert_eq!(check.overflow, dec!(2));
        assert_eq!(
            store
                .linkages_for_item(item.company_id(), item.id_typed())
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn strict_store_refuses_overflow() {
        let config = EngineConfig {
            strict_linkage_quantity: true,
            ..EngineConfig::default()
        };
        let store = InMemoryLinkageStore::new(&config);
        let item = item(CompanyId::new(), ProcessId::generate(), 1);

        store.register(&item, linkage(&item, dec!(10))).unwrap();
        let err = store.register(&item, linkage(&item, dec!(1))).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Domain(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn items_are_listed_by_number() {
        let repo = InMemoryItemRepository::new();
        let company = CompanyId::new();
        let process = ProcessId::generate();
        repo.save(item(company, process, 3)).unwrap();
        repo.save(item(company, process, 1)).unwrap();
        repo.save(item(company, ProcessId::generate(), 2)).unwrap();

        let numbers: Vec<u32> = repo
            .list_for_process(company, process)
            .unwrap()
            .iter()
            .map(ProcessItem::number)
            .collect();
        assert_eq!(numbers, vec![1, 3]);
        assert!(repo.list_for_process(CompanyId::new(), process).unwrap().is_empty());
    }

    #[test]
    fn instruments_are_scoped_to_their_process() {
        let store = InMemoryInstrumentStore::new();
        let company = CompanyId::new();
        let process = ProcessId::generate();
        let header = |process_id| InstrumentHeader {
            company_id: company,
            process_id,
            number: "CT 01/2024".to_string(),
            total_value: dec!(1000),
            issued_on: None,
        };
        store.insert(Instrument::contract(ContractId::generate(), header(process)).unwrap());
        store.insert(
            Instrument::contract(ContractId::generate(), header(ProcessId::generate())).unwrap(),
        );

        assert_eq!(store.instruments_for_process(company, process).unwrap().len(), 1);
    }
}
