use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{NaiveDate, TimeZone, Utc};
use licitacao_core::CompanyId;
use licitacao_fulfillment::{
    ContractId, Instrument, InstrumentHeader, Invoice, InvoiceDirection, InvoiceId, Linkage,
    LinkageId, Quotation, QuotationId, Settlement,
};
use licitacao_infra::{
    Collaborators, DefaultStatusPolicy, EngineConfig, InMemoryBackend, InMemoryEventLog,
    ProcessLifecycleService,
};
use licitacao_processes::{
    CandidateValues, ItemStatus, Modality, ProcessDetails, ProcessId, ProcessItem, ProcessItemId,
};
use licitacao_valuation::ItemValuationEngine;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Inputs of one process with `size` items, each linked to its own contract
/// with one paid and one pending invoice.
struct Fixture {
    items: Vec<ProcessItem>,
    instruments: Vec<Instrument>,
    linkages: Vec<Linkage>,
    invoices: Vec<Invoice>,
    quotations: Vec<Quotation>,
}

fn fixture(company_id: CompanyId, process_id: ProcessId, size: u32) -> Fixture {
    let mut f = Fixture {
        items: Vec::new(),
        instruments: Vec::new(),
        linkages: Vec::new(),
        invoices: Vec::new(),
        quotations: Vec::new(),
    };

    for number in 1..=size {
        let mut item = ProcessItem::new(
            ProcessItemId::generate(),
            process_id,
            company_id,
            number,
            format!("Item {number}"),
            dec!(10),
            "UN",
        )
        .unwrap()
        .with_candidates(CandidateValues {
            estimated: Some(dec!(12.5)),
            negotiated: Some(dec!(11.37)),
            ..CandidateValues::default()
        });
        item.set_status(ItemStatus::Accepted).unwrap();

        let contract = Instrument::contract(
            ContractId::generate(),
            InstrumentHeader {
                company_id,
                process_id,
                number: format!("CT {number}/2024"),
                total_value: dec!(113.70),
                issued_on: None,
            },
        )
        .unwrap();
        f.linkages.push(
            Linkage::new(
                LinkageId::generate(),
                company_id,
                process_id,
                item.id_typed(),
                contract.reference(),
                dec!(10),
                dec!(11.37),
                None,
            )
            .unwrap(),
        );
        for (settlement, value) in [(Settlement::Paga, dec!(80)), (Settlement::Pendente, dec!(33.70))] {
            f.invoices.push(
                Invoice::new(
                    InvoiceId::generate(),
                    company_id,
                    format!("NF {number}"),
                    InvoiceDirection::Saida,
                    settlement,
                    value,
                )
                .unwrap()
                .attached_to(contract.reference()),
            );
        }
        f.quotations.push(Quotation {
            id: QuotationId::generate(),
            company_id,
            item_id: item.id_typed(),
            supplier: "Distribuidora Paulista".to_string(),
            product_cost: dec!(8.40),
            freight: dec!(0.35),
            freight_included: false,
            chosen_supplier: true,
        });

        f.instruments.push(contract);
        f.items.push(item);
    }
    f
}

fn received_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
}

fn bench_value_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_all");
    let engine = ItemValuationEngine::new();

    for size in [10u32, 100, 1_000] {
        let f = fixture(CompanyId::new(), ProcessId::generate(), size);
        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &f, |b, f| {
            b.iter(|| {
                black_box(engine.value_all(
                    black_box(&f.items),
                    Some(received_on()),
                    &f.linkages,
                    &f.invoices,
                    &f.quotations,
                ))
            });
        });
    }

    group.finish();
}

fn setup_service(size: u32) -> (ProcessLifecycleService, CompanyId, ProcessId) {
    let config = EngineConfig {
        auto_close_on_payment: false,
        ..EngineConfig::default()
    };
    let backend = InMemoryBackend::new(&config);
    let events = Arc::new(InMemoryEventLog::new());
    let deps = Collaborators::in_memory(&backend, Arc::new(DefaultStatusPolicy), events);
    let service = ProcessLifecycleService::new(deps, config);

    let company_id = CompanyId::new();
    let process_id = ProcessId::generate();
    let at = Utc.with_ymd_and_hms(2024, 9, 1, 10, 0, 0).unwrap();
    service
        .create(
            company_id,
            process_id,
            ProcessDetails {
                government_body: "Secretaria Estadual de Saúde".to_string(),
                sector: None,
                modality: Modality::PregaoEletronico,
                number: "PE 90/2024".to_string(),
                object_summary: "Insumos hospitalares".to_string(),
                delivery_terms: None,
                public_session_at: None,
                proposal_valid_from: None,
                proposal_valid_until: None,
            },
            at,
        )
        .unwrap();
    service.mark_won(company_id, process_id, at).unwrap();

    let f = fixture(company_id, process_id, size);
    for item in &f.items {
        service.add_item(company_id, item.clone()).unwrap();
    }
    for (item, linkage) in f.items.iter().zip(f.linkages) {
        backend.linkages.register(item, linkage).unwrap();
    }
    for instrument in f.instruments {
        backend.instruments.insert(instrument);
    }
    for invoice in f.invoices {
        backend.invoices.insert(invoice);
    }
    for quotation in f.quotations {
        backend.quotations.insert(quotation).unwrap();
    }

    (service, company_id, process_id)
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    group.sample_size(50);

    for size in [10u32, 100] {
        let (service, company_id, process_id) = setup_service(size);
        group.throughput(Throughput::Elements(u64::from(size)));

        group.bench_with_input(BenchmarkId::new("recompute_process", size), &size, |b, _| {
            b.iter(|| {
                service
                    .recompute_process(black_box(company_id), black_box(process_id))
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("confirm_payment", size), &size, |b, _| {
            let at = Utc.with_ymd_and_hms(2024, 10, 1, 8, 0, 0).unwrap();
            b.iter(|| {
                service
                    .confirm_payment(company_id, process_id, received_on(), at)
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("balances", size), &size, |b, _| {
            b.iter(|| service.balances(company_id, process_id).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_value_all, bench_lifecycle);
criterion_main!(benches);
