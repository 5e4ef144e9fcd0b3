//! Process lifecycle orchestration.
//!
//! Every operation follows the same pipeline:
//!
//! ```text
//! load (company-scoped) → decide (aggregate + valuation, no writes)
//!   → append events (sequence checked) → save process → save items
//! ```
//!
//! Nothing is written until every decision succeeded, so a guard or not-found
//! failure leaves the stores untouched. Each public method is a single entry
//! point a persistence layer can wrap in one transaction.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};
use uuid::Uuid;

use licitacao_core::{AggregateRoot, CompanyId, DomainError, ExpectedVersion};
use licitacao_events::{Event, EventEnvelope};
use licitacao_fulfillment::{InstrumentRef, Invoice, Linkage, Quotation};
use licitacao_processes::{
    CreateProcess, DeleteProcess, FinalSituation, FinalizeReason, ItemStatus, ParticipationStatus,
    Process, ProcessCommand, ProcessDetails, ProcessEvent, ProcessId, ProcessItem, ProcessItemId,
    ProcessStatus, ProcessTransition, SetParticipationStatus, StatusChange, TransitionTable,
    UpdateDetails,
};
use licitacao_valuation::{
    BalanceAggregator, FinalizationCheck, ItemSnapshot, ItemValuation, ItemValuationEngine,
    LinkageRegistry, ProcessBalances, settled_for_closing,
};

use crate::config::EngineConfig;
use crate::error::{LifecycleError, StoreError};
use crate::memory::InMemoryBackend;
use crate::ports::{
    EventSink, InstrumentProvider, InvoiceProvider, ItemRepository, LinkageProvider,
    ProcessRepository, QuotationProvider, StatusTransitionPolicy,
};

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Aggregate type recorded on every process event envelope.
pub const PROCESS_AGGREGATE_TYPE: &str = "licitacao.process";

/// External collaborators of the lifecycle service.
#[derive(Clone)]
pub struct Collaborators {
    pub processes: Arc<dyn ProcessRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub linkages: Arc<dyn LinkageProvider>,
    pub invoices: Arc<dyn InvoiceProvider>,
    pub quotations: Arc<dyn QuotationProvider>,
    pub instruments: Arc<dyn InstrumentProvider>,
    pub policy: Arc<dyn StatusTransitionPolicy>,
    pub events: Arc<dyn EventSink>,
}

impl Collaborators {
    /// Wire the in-memory backend with a policy and an event sink.
    pub fn in_memory(
        backend: &InMemoryBackend,
        policy: Arc<dyn StatusTransitionPolicy>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            processes: backend.processes.clone(),
            items: backend.items.clone(),
            linkages: backend.linkages.clone(),
            invoices: backend.invoices.clone(),
            quotations: backend.quotations.clone(),
            instruments: backend.instruments.clone(),
            policy,
            events,
        }
    }
}

/// Result of a payment confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentConfirmation {
    pub status: ProcessStatus,
    pub payment_received_on: Option<NaiveDate>,
    /// The confirmation also closed the process.
    pub closed: bool,
    pub valuations: BTreeMap<ProcessItemId, ItemValuation>,
}

/// Everything the valuation of a whole process reads.
struct ProcessInputs {
    items: Vec<ProcessItem>,
    linkages: Vec<Linkage>,
    invoices: Vec<Invoice>,
    quotations: Vec<Quotation>,
}

pub struct ProcessLifecycleService {
    deps: Collaborators,
    config: EngineConfig,
    engine: ItemValuationEngine,
}

impl ProcessLifecycleService {
    pub fn new(deps: Collaborators, config: EngineConfig) -> Self {
        Self {
            deps,
            config,
            engine: ItemValuationEngine::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a process in `participacao`.
    pub fn create(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        details: ProcessDetails,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        if self.deps.processes.find(company_id, process_id)?.is_some() {
            return Err(DomainError::conflict("process already exists").into());
        }

        let current = Process::empty(process_id);
        let command = ProcessCommand::CreateProcess(CreateProcess {
            company_id,
            process_id,
            details,
            occurred_at: at,
        });
        let (next, events) = current.execute(&command)?;
        let saved = self.commit(company_id, &current, next, events, Vec::new())?;

        info!(company = %company_id, process = %process_id, "process created");
        Ok(saved)
    }

    pub fn update_details(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        details: ProcessDetails,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        self.execute(
            company_id,
            process_id,
            ProcessCommand::UpdateDetails(UpdateDetails {
                company_id,
                process_id,
                details,
                occurred_at: at,
            }),
        )
    }

    pub fn set_participation_status(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        participation_status: ParticipationStatus,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        self.execute(
            company_id,
            process_id,
            ProcessCommand::SetParticipationStatus(SetParticipationStatus {
                company_id,
                process_id,
                participation_status,
                occurred_at: at,
            }),
        )
    }

    /// Soft delete. The process stays stored but is no longer visible.
    pub fn delete(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        let deleted = self.execute(
            company_id,
            process_id,
            ProcessCommand::DeleteProcess(DeleteProcess {
                company_id,
                process_id,
                occurred_at: at,
            }),
        )?;
        info!(company = %company_id, process = %process_id, "process deleted");
        Ok(deleted)
    }

    /// Attach a new item to a visible process and value it.
    pub fn add_item(&self, company_id: CompanyId, item: ProcessItem) -> LifecycleResult<ItemValuation> {
        if item.company_id() != company_id {
            return Err(LifecycleError::NotFound);
        }
        self.load_process(company_id, item.process_id())?;
        if self.deps.items.find(company_id, item.id_typed())?.is_some() {
            return Err(DomainError::conflict(format!("item {} already exists", item.id_typed())).into());
        }

        let item_id = item.id_typed();
        self.deps.items.save(item)?;
        self.recompute_item(company_id, item_id)
    }

    /// Change the judging status of one item and revalue it.
    pub fn set_item_status(
        &self,
        company_id: CompanyId,
        item_id: ProcessItemId,
        status: ItemStatus,
    ) -> LifecycleResult<ItemValuation> {
        let mut item = self.load_item(company_id, item_id)?;
        let process = self.load_process(company_id, item.process_id())?;
        item.set_status(status)?;

        let inputs = ItemInputs::load(self, company_id, &item)?;
        let valuation = self
            .engine
            .value(&inputs.snapshot(&item, process.payment_received_on()));
        valuation.apply_to(&mut item);
        self.deps.items.save(item)?;

        debug!(company = %company_id, item = %item_id, status = %status, "item status changed");
        Ok(valuation)
    }

    /// Fix `situacao_final` of every item. Refused while any item is pending.
    pub fn conclude_judging(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> LifecycleResult<BTreeMap<ProcessItemId, FinalSituation>> {
        let process = self.load_process(company_id, process_id)?;
        let mut inputs = self.load_inputs(company_id, process_id)?;

        let mut outcomes = BTreeMap::new();
        for item in &mut inputs.items {
            outcomes.insert(item.id_typed(), item.conclude_judging()?);
        }

        let valuations = self.value(&process, &inputs);
        let items = apply_all(inputs.items, &valuations);
        self.deps.items.save_all(items)?;

        info!(company = %company_id, process = %process_id, items = outcomes.len(), "judging concluded");
        Ok(outcomes)
    }

    /// `participacao → julgamento_habilitacao`.
    pub fn move_to_judging(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        self.change_status(company_id, process_id, StatusChange::MoveToJudging, at)
    }

    /// Mark the process as won; it enters `execucao`.
    pub fn mark_won(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        self.change_status(company_id, process_id, StatusChange::MarkWon, at)
    }

    /// `execucao → pagamento`.
    pub fn enter_payment(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        self.change_status(company_id, process_id, StatusChange::EnterPayment, at)
    }

    /// Confirm the payment was received.
    ///
    /// Sets the payment date, revalues every item and, when enabled, closes the
    /// process if every accepted item is settled. All writes happen together at
    /// the end.
    pub fn confirm_payment(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        received_on: NaiveDate,
        at: DateTime<Utc>,
    ) -> LifecycleResult<PaymentConfirmation> {
        let current = self.load_process(company_id, process_id)?;
        let command = ProcessCommand::change_status(
            company_id,
            process_id,
            StatusChange::ConfirmPayment { received_on },
            at,
        );
        let (mut next, mut events) = current.execute(&command)?;

        let inputs = self.load_inputs(company_id, process_id)?;
        let valuations = self.value(&next, &inputs);

        let settled = settled_for_closing(&inputs.items, &valuations);
        let closed = self.config.auto_close_on_payment && settled;
        if closed {
            let close = ProcessCommand::change_status(
                company_id,
                process_id,
                StatusChange::Finalize {
                    reason: FinalizeReason::PaymentSettled,
                },
                at,
            );
            let (finalized, close_events) = next.execute(&close)?;
            next = finalized;
            events.extend(close_events);
        } else if settled {
            debug!(company = %company_id, process = %process_id, "auto-close disabled, process stays open");
        }

        let items = apply_all(inputs.items, &valuations);
        let saved = self.commit(company_id, &current, next, events, items)?;

        info!(
            company = %company_id,
            process = %process_id,
            received_on = %received_on,
            items = valuations.len(),
            closed,
            "payment confirmed"
        );
        Ok(PaymentConfirmation {
            status: saved.status(),
            payment_received_on: saved.payment_received_on(),
            closed,
            valuations,
        })
    }

    /// Close the process manually once every won item is fully linked.
    pub fn finalize(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        let current = self.load_process(company_id, process_id)?;
        TransitionTable::check(current.status(), ProcessTransition::Finalize)?;

        let check = self.finalization_check(company_id, process_id)?;
        if let Some(reason) = check.reason() {
            warn!(company = %company_id, process = %process_id, blocking = check.blocking.len(), "finalization refused");
            return Err(LifecycleError::Rejected(reason));
        }

        self.change_status(
            company_id,
            process_id,
            StatusChange::Finalize {
                reason: FinalizeReason::Manual,
            },
            at,
        )
    }

    /// Move to `perdido`, subject to the status policy.
    pub fn mark_lost(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        self.guarded_change(company_id, process_id, StatusChange::MarkLost { reason }, at)
    }

    /// Move to `arquivado`, subject to the status policy.
    pub fn archive(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        self.guarded_change(company_id, process_id, StatusChange::Archive, at)
    }

    /// Revalue one item after its linkages, invoices or quotation changed.
    pub fn recompute_item(
        &self,
        company_id: CompanyId,
        item_id: ProcessItemId,
    ) -> LifecycleResult<ItemValuation> {
        let mut item = self.load_item(company_id, item_id)?;
        let payment_date = self.payment_date(company_id, item.process_id())?;

        let inputs = ItemInputs::load(self, company_id, &item)?;
        let valuation = self.engine.value(&inputs.snapshot(&item, payment_date));
        valuation.apply_to(&mut item);
        self.deps.items.save(item)?;

        debug!(company = %company_id, item = %item_id, "item recomputed");
        Ok(valuation)
    }

    /// Revalue every item of a process.
    pub fn recompute_process(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> LifecycleResult<BTreeMap<ProcessItemId, ItemValuation>> {
        let process = self.load_process(company_id, process_id)?;
        let inputs = self.load_inputs(company_id, process_id)?;
        let valuations = self.value(&process, &inputs);
        self.deps.items.save_all(apply_all(inputs.items, &valuations))?;

        debug!(company = %company_id, process = %process_id, items = valuations.len(), "process recomputed");
        Ok(valuations)
    }

    /// Process-level balance rollup. Read-only.
    pub fn balances(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> LifecycleResult<ProcessBalances> {
        self.load_process(company_id, process_id)?;
        let items = self.deps.items.list_for_process(company_id, process_id)?;
        let instruments = self
            .deps
            .instruments
            .instruments_for_process(company_id, process_id)?;
        Ok(BalanceAggregator::for_process(process_id).aggregate(&items, &instruments))
    }

    /// `podeSerFinalizado`.
    pub fn finalization_check(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> LifecycleResult<FinalizationCheck> {
        self.load_process(company_id, process_id)?;
        let items = self.deps.items.list_for_process(company_id, process_id)?;
        let linkages = self
            .deps
            .linkages
            .linkages_for_process(company_id, process_id)?;
        Ok(FinalizationCheck::evaluate(
            &items,
            &LinkageRegistry::new(&linkages),
        ))
    }

    fn guarded_change(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        change: StatusChange,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        let current = self.load_process(company_id, process_id)?;
        let transition = change.transition();
        TransitionTable::check(current.status(), transition)?;

        let items = self.deps.items.list_for_process(company_id, process_id)?;
        let decision = self.deps.policy.evaluate(&current, &items, transition);
        if !decision.allowed {
            warn!(
                company = %company_id,
                process = %process_id,
                transition = %transition,
                reason = %decision.reason,
                "status policy refused transition"
            );
            return Err(LifecycleError::Rejected(decision.reason));
        }

        self.change_status(company_id, process_id, change, at)
    }

    fn change_status(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        change: StatusChange,
        at: DateTime<Utc>,
    ) -> LifecycleResult<Process> {
        let transition = change.transition();
        let saved = self.execute(
            company_id,
            process_id,
            ProcessCommand::change_status(company_id, process_id, change, at),
        )?;
        info!(
            company = %company_id,
            process = %process_id,
            transition = %transition,
            status = %saved.status(),
            "process status changed"
        );
        Ok(saved)
    }

    fn execute(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
        command: ProcessCommand,
    ) -> LifecycleResult<Process> {
        let current = self.load_process(company_id, process_id)?;
        let (next, events) = current.execute(&command)?;
        self.commit(company_id, &current, next, events, Vec::new())
    }

    fn load_process(&self, company_id: CompanyId, process_id: ProcessId) -> LifecycleResult<Process> {
        match self.deps.processes.find(company_id, process_id)? {
            Some(process) if process.is_visible_to(company_id) => Ok(process),
            _ => Err(LifecycleError::NotFound),
        }
    }

    fn load_item(&self, company_id: CompanyId, item_id: ProcessItemId) -> LifecycleResult<ProcessItem> {
        match self.deps.items.find(company_id, item_id)? {
            Some(item) if item.company_id() == company_id => Ok(item),
            _ => Err(LifecycleError::NotFound),
        }
    }

    fn payment_date(
        &self,
        company_id: CompanyId,
        process_id: ProcessId,
    ) -> LifecycleResult<Option<NaiveDate>> {
        Ok(self.load_process(company_id, process_id)?.payment_received_on())
    }

    fn load_inputs(&self, company_id: CompanyId, process_id: ProcessId) -> LifecycleResult<ProcessInputs> {
        let items = self.deps.items.list_for_process(company_id, process_id)?;
        let linkages = self
            .deps
            .linkages
            .linkages_for_process(company_id, process_id)?;
        let invoices = self.reachable_invoices(company_id, &linkages)?;

        let mut quotations = Vec::new();
        for item in &items {
            if let Some(q) = self.deps.quotations.chosen_for(company_id, item.id_typed())? {
                quotations.push(q);
            }
        }

        Ok(ProcessInputs {
            items,
            linkages,
            invoices,
            quotations,
        })
    }

    fn reachable_invoices(
        &self,
        company_id: CompanyId,
        linkages: &[Linkage],
    ) -> Result<Vec<Invoice>, StoreError> {
        let instruments: BTreeSet<InstrumentRef> = linkages.iter().map(Linkage::instrument).collect();
        let mut invoices = Vec::new();
        for instrument in instruments {
            invoices.extend(
                self.deps
                    .invoices
                    .invoices_for_instrument(company_id, instrument)?,
            );
        }
        Ok(invoices)
    }

    fn value(
        &self,
        process: &Process,
        inputs: &ProcessInputs,
    ) -> BTreeMap<ProcessItemId, ItemValuation> {
        self.engine.value_all(
            &inputs.items,
            process.payment_received_on(),
            &inputs.linkages,
            &inputs.invoices,
            &inputs.quotations,
        )
    }

    /// Append the events, then persist the process and the items.
    ///
    /// The append is the commit point: the sink refuses a stale sequence
    /// number, so a concurrent writer fails before any state is written.
    fn commit(
        &self,
        company_id: CompanyId,
        current: &Process,
        next: Process,
        events: Vec<ProcessEvent>,
        items: Vec<ProcessItem>,
    ) -> LifecycleResult<Process> {
        let envelopes = envelopes(company_id, current, &events)?;
        if !envelopes.is_empty() {
            self.deps.events.append(envelopes)?;
        }

        let saved = self
            .deps
            .processes
            .save(next, ExpectedVersion::Exact(current.version()))?;
        if !items.is_empty() {
            self.deps.items.save_all(items)?;
        }
        Ok(saved)
    }
}

/// Inputs of a single item valuation.
struct ItemInputs {
    linkages: Vec<Linkage>,
    invoices: Vec<Invoice>,
    quotation: Option<Quotation>,
}

impl ItemInputs {
    fn load(
        service: &ProcessLifecycleService,
        company_id: CompanyId,
        item: &ProcessItem,
    ) -> LifecycleResult<Self> {
        let linkages = service
            .deps
            .linkages
            .linkages_for_item(company_id, item.id_typed())?;
        let invoices = service.reachable_invoices(company_id, &linkages)?;
        let quotation = service
            .deps
            .quotations
            .chosen_for(company_id, item.id_typed())?;
        Ok(Self {
            linkages,
            invoices,
            quotation,
        })
    }

    fn snapshot<'a>(
        &'a self,
        item: &'a ProcessItem,
        payment_received_on: Option<NaiveDate>,
    ) -> ItemSnapshot<'a> {
        ItemSnapshot {
            item,
            payment_received_on,
            linkages: &self.linkages,
            invoices: &self.invoices,
            quotation: self.quotation.as_ref(),
        }
    }
}

fn apply_all(
    mut items: Vec<ProcessItem>,
    valuations: &BTreeMap<ProcessItemId, ItemValuation>,
) -> Vec<ProcessItem> {
    for item in &mut items {
        if let Some(valuation) = valuations.get(&item.id_typed()) {
            valuation.apply_to(item);
        }
    }
    items
}

fn envelopes(
    company_id: CompanyId,
    current: &Process,
    events: &[ProcessEvent],
) -> Result<Vec<EventEnvelope<JsonValue>>, StoreError> {
    let aggregate_id = current.id_typed().aggregate_id();
    events
        .iter()
        .enumerate()
        .map(|(idx, event)| {
            if event.company_id() != company_id {
                return Err(StoreError::CompanyIsolation);
            }
            EventEnvelope::record(
                Uuid::now_v7(),
                PROCESS_AGGREGATE_TYPE,
                aggregate_id,
                current.version() + idx as u64 + 1,
                event,
            )
            .map_err(|e| StoreError::Storage(e.to_string()))
        })
        .collect()
}
