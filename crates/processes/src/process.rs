use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use licitacao_core::{Aggregate, AggregateRoot, CompanyId, DomainError, DomainResult, typed_id};
use licitacao_events::Event;

use crate::status::{ProcessStatus, ProcessTransition, TransitionTable};

typed_id!(
    /// Process identifier (company-scoped via `company_id` fields in events/commands).
    ProcessId
);

/// Bidding modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    PregaoEletronico,
    PregaoPresencial,
    Concorrencia,
    TomadaPrecos,
    Convite,
    Dispensa,
    Inexigibilidade,
}

/// Sub-status while the process is still in `participacao`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationStatus {
    #[default]
    Normal,
    Adiada,
    Suspensa,
    Cancelada,
}

/// Descriptive fields of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDetails {
    /// Issuing government body ("órgão").
    pub government_body: String,
    pub sector: Option<String>,
    pub modality: Modality,
    pub number: String,
    /// Object summary ("objeto resumido").
    pub object_summary: String,
    pub delivery_terms: Option<String>,
    pub public_session_at: Option<DateTime<Utc>>,
    pub proposal_valid_from: Option<NaiveDate>,
    pub proposal_valid_until: Option<NaiveDate>,
}

impl ProcessDetails {
    fn validate(&self) -> DomainResult<()> {
        if self.government_body.trim().is_empty() {
            return Err(DomainError::validation("government body is required"));
        }
        if self.object_summary.trim().is_empty() {
            return Err(DomainError::validation("object summary is required"));
        }
        if let (Some(from), Some(until)) = (self.proposal_valid_from, self.proposal_valid_until) {
            if until < from {
                return Err(DomainError::validation(
                    "proposal validity window ends before it starts",
                ));
            }
        }
        Ok(())
    }
}

/// Aggregate root: Process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    id: ProcessId,
    company_id: Option<CompanyId>,
    details: Option<ProcessDetails>,
    status: ProcessStatus,
    participation_status: ParticipationStatus,
    payment_received_on: Option<NaiveDate>,
    archived_on: Option<NaiveDate>,
    loss_reason: Option<String>,
    deleted: bool,
    version: u64,
    created: bool,
}

impl Process {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ProcessId) -> Self {
        Self {
            id,
            company_id: None,
            details: None,
            status: ProcessStatus::Participation,
            participation_status: ParticipationStatus::Normal,
            payment_received_on: None,
            archived_on: None,
            loss_reason: None,
            deleted: false,
            version: 0,
            created: false,
        }
    }

    /// Rebuild a process from its event history.
    pub fn from_events<'a, I>(id: ProcessId, events: I) -> Self
    where
        I: IntoIterator<Item = &'a ProcessEvent>,
    {
        let mut process = Self::empty(id);
        for event in events {
            process.apply(event);
        }
        process
    }

    pub fn id_typed(&self) -> ProcessId {
        self.id
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    pub fn details(&self) -> Option<&ProcessDetails> {
        self.details.as_ref()
    }

    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    pub fn participation_status(&self) -> ParticipationStatus {
        self.participation_status
    }

    /// Date the payment was confirmed as received, if any.
    pub fn payment_received_on(&self) -> Option<NaiveDate> {
        self.payment_received_on
    }

    pub fn archived_on(&self) -> Option<NaiveDate> {
        self.archived_on
    }

    pub fn loss_reason(&self) -> Option<&str> {
        self.loss_reason.as_deref()
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// `isEmExecucao`.
    pub fn is_in_execution(&self) -> bool {
        self.status.is_in_execution()
    }

    /// Visible to `company_id` (exists, not deleted, same owner).
    pub fn is_visible_to(&self, company_id: CompanyId) -> bool {
        self.created && !self.deleted && self.company_id == Some(company_id)
    }

    /// Handle a command and return the updated process together with the events.
    ///
    /// `self` is left untouched; callers persist the returned value explicitly.
    pub fn execute(&self, command: &ProcessCommand) -> DomainResult<(Process, Vec<ProcessEvent>)> {
        let events = self.handle(command)?;
        let mut next = self.clone();
        for event in &events {
            next.apply(event);
        }
        Ok((next, events))
    }
}

impl AggregateRoot for Process {
    type Id = ProcessId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProcess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProcess {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub details: ProcessDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDetails (only before execution).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetails {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub details: ProcessDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetParticipationStatus (only during `participacao`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetParticipationStatus {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub participation_status: ParticipationStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Why a process is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeReason {
    /// Every accepted item was settled when payment was confirmed.
    PaymentSettled,
    /// Explicit request, after the delivery check passed.
    Manual,
}

/// Requested status move with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusChange {
    MoveToJudging,
    MarkWon,
    EnterPayment,
    ConfirmPayment { received_on: NaiveDate },
    Finalize { reason: FinalizeReason },
    MarkLost { reason: Option<String> },
    Archive,
}

impl StatusChange {
    pub fn transition(&self) -> ProcessTransition {
        match self {
            StatusChange::MoveToJudging => ProcessTransition::MoveToJudging,
            StatusChange::MarkWon => ProcessTransition::MarkWon,
            StatusChange::EnterPayment => ProcessTransition::EnterPayment,
            StatusChange::ConfirmPayment { .. } => ProcessTransition::ConfirmPayment,
            StatusChange::Finalize { .. } => ProcessTransition::Finalize,
            StatusChange::MarkLost { .. } => ProcessTransition::MarkLost,
            StatusChange::Archive => ProcessTransition::Archive,
        }
    }
}

/// Command: ChangeStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub change: StatusChange,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteProcess (soft delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProcess {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessCommand {
    CreateProcess(CreateProcess),
    UpdateDetails(UpdateDetails),
    SetParticipationStatus(SetParticipationStatus),
    ChangeStatus(ChangeStatus),
    DeleteProcess(DeleteProcess),
}

impl ProcessCommand {
    pub fn change_status(
        company_id: CompanyId,
        process_id: ProcessId,
        change: StatusChange,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        ProcessCommand::ChangeStatus(ChangeStatus {
            company_id,
            process_id,
            change,
            occurred_at,
        })
    }
}

/// Event: ProcessCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCreated {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub details: ProcessDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DetailsUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsUpdated {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub details: ProcessDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ParticipationStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationStatusChanged {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub participation_status: ParticipationStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub from: ProcessStatus,
    pub to: ProcessStatus,
    pub transition: ProcessTransition,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmed {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub received_on: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProcessClosed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessClosed {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub reason: FinalizeReason,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LossRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossRecorded {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProcessDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDeleted {
    pub company_id: CompanyId,
    pub process_id: ProcessId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessEvent {
    ProcessCreated(ProcessCreated),
    DetailsUpdated(DetailsUpdated),
    ParticipationStatusChanged(ParticipationStatusChanged),
    StatusChanged(StatusChanged),
    PaymentConfirmed(PaymentConfirmed),
    ProcessClosed(ProcessClosed),
    LossRecorded(LossRecorded),
    ProcessDeleted(ProcessDeleted),
}

impl Event for ProcessEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProcessEvent::ProcessCreated(_) => "licitacao.process.created",
            ProcessEvent::DetailsUpdated(_) => "licitacao.process.details_updated",
            ProcessEvent::ParticipationStatusChanged(_) => {
                "licitacao.process.participation_status_changed"
            }
            ProcessEvent::StatusChanged(_) => "licitacao.process.status_changed",
            ProcessEvent::PaymentConfirmed(_) => "licitacao.process.payment_confirmed",
            ProcessEvent::ProcessClosed(_) => "licitacao.process.closed",
            ProcessEvent::LossRecorded(_) => "licitacao.process.loss_recorded",
            ProcessEvent::ProcessDeleted(_) => "licitacao.process.deleted",
        }
    }

    fn company_id(&self) -> CompanyId {
        match self {
            ProcessEvent::ProcessCreated(e) => e.company_id,
            ProcessEvent::DetailsUpdated(e) => e.company_id,
            ProcessEvent::ParticipationStatusChanged(e) => e.company_id,
            ProcessEvent::StatusChanged(e) => e.company_id,
            ProcessEvent::PaymentConfirmed(e) => e.company_id,
            ProcessEvent::ProcessClosed(e) => e.company_id,
            ProcessEvent::LossRecorded(e) => e.company_id,
            ProcessEvent::ProcessDeleted(e) => e.company_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProcessEvent::ProcessCreated(e) => e.occurred_at,
            ProcessEvent::DetailsUpdated(e) => e.occurred_at,
            ProcessEvent::ParticipationStatusChanged(e) => e.occurred_at,
            ProcessEvent::StatusChanged(e) => e.occurred_at,
            ProcessEvent::PaymentConfirmed(e) => e.occurred_at,
            ProcessEvent::ProcessClosed(e) => e.occurred_at,
            ProcessEvent::LossRecorded(e) => e.occurred_at,
            ProcessEvent::ProcessDeleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Process {
    type Command = ProcessCommand;
    type Event = ProcessEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProcessEvent::ProcessCreated(e) => {
                self.id = e.process_id;
                self.company_id = Some(e.company_id);
                self.details = Some(e.details.clone());
                self.status = ProcessStatus::Participation;
                self.participation_status = ParticipationStatus::Normal;
                self.created = true;
            }
            ProcessEvent::DetailsUpdated(e) => {
                self.details = Some(e.details.clone());
            }
            ProcessEvent::ParticipationStatusChanged(e) => {
                self.participation_status = e.participation_status;
            }
            ProcessEvent::StatusChanged(e) => {
                self.status = e.to;
                if e.to == ProcessStatus::Archived {
                    self.archived_on = Some(e.occurred_at.date_naive());
                }
            }
            ProcessEvent::PaymentConfirmed(e) => {
                self.payment_received_on = Some(e.received_on);
            }
            ProcessEvent::ProcessClosed(_) => {}
            ProcessEvent::LossRecorded(e) => {
                self.loss_reason = e.reason.clone();
            }
            ProcessEvent::ProcessDeleted(_) => {
                self.deleted = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProcessCommand::CreateProcess(cmd) => self.handle_create(cmd),
            ProcessCommand::UpdateDetails(cmd) => self.handle_update_details(cmd),
            ProcessCommand::SetParticipationStatus(cmd) => self.handle_participation(cmd),
            ProcessCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
            ProcessCommand::DeleteProcess(cmd) => self.handle_delete(cmd),
        }
    }
}

impl Process {
    /// A process owned by another company is reported as missing.
    fn ensure_visible(&self, company_id: CompanyId, process_id: ProcessId) -> DomainResult<()> {
        if !self.is_visible_to(company_id) || self.id != process_id {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateProcess) -> DomainResult<Vec<ProcessEvent>> {
        if self.created {
            return Err(DomainError::conflict("process already exists"));
        }
        cmd.details.validate()?;

        Ok(vec![ProcessEvent::ProcessCreated(ProcessCreated {
            company_id: cmd.company_id,
            process_id: cmd.process_id,
            details: cmd.details.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_details(&self, cmd: &UpdateDetails) -> DomainResult<Vec<ProcessEvent>> {
        self.ensure_visible(cmd.company_id, cmd.process_id)?;

        if self.status.locks_details() {
            return Err(DomainError::invariant(format!(
                "process details are read-only in status {}",
                self.status
            )));
        }
        cmd.details.validate()?;

        Ok(vec![ProcessEvent::DetailsUpdated(DetailsUpdated {
            company_id: cmd.company_id,
            process_id: cmd.process_id,
            details: cmd.details.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_participation(
        &self,
        cmd: &SetParticipationStatus,
    ) -> DomainResult<Vec<ProcessEvent>> {
        self.ensure_visible(cmd.company_id, cmd.process_id)?;

        if self.status != ProcessStatus::Participation {
            return Err(DomainError::invariant(
                "participation status can only change during participacao",
            ));
        }

        Ok(vec![ProcessEvent::ParticipationStatusChanged(
            ParticipationStatusChanged {
                company_id: cmd.company_id,
                process_id: cmd.process_id,
                participation_status: cmd.participation_status,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> DomainResult<Vec<ProcessEvent>> {
        self.ensure_visible(cmd.company_id, cmd.process_id)?;

        let transition = cmd.change.transition();
        let to = TransitionTable::check(self.status, transition)?;

        let mut events = Vec::with_capacity(2);
        match &cmd.change {
            StatusChange::ConfirmPayment { received_on } => {
                events.push(ProcessEvent::PaymentConfirmed(PaymentConfirmed {
                    company_id: cmd.company_id,
                    process_id: cmd.process_id,
                    received_on: *received_on,
                    occurred_at: cmd.occurred_at,
                }));
            }
            StatusChange::MarkLost { reason } => {
                let reason = reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string);
                events.push(self.status_changed(cmd, to, transition));
                events.push(ProcessEvent::LossRecorded(LossRecorded {
                    company_id: cmd.company_id,
                    process_id: cmd.process_id,
                    reason,
                    occurred_at: cmd.occurred_at,
                }));
            }
            StatusChange::Finalize { reason } => {
                events.push(self.status_changed(cmd, to, transition));
                events.push(ProcessEvent::ProcessClosed(ProcessClosed {
                    company_id: cmd.company_id,
                    process_id: cmd.process_id,
                    reason: *reason,
                    occurred_at: cmd.occurred_at,
                }));
            }
            StatusChange::MoveToJudging
            | StatusChange::MarkWon
            | StatusChange::EnterPayment
            | StatusChange::Archive => {
                events.push(self.status_changed(cmd, to, transition));
            }
        }

        Ok(events)
    }

    fn status_changed(
        &self,
        cmd: &ChangeStatus,
        to: ProcessStatus,
        transition: ProcessTransition,
    ) -> ProcessEvent {
        ProcessEvent::StatusChanged(StatusChanged {
            company_id: cmd.company_id,
            process_id: cmd.process_id,
            from: self.status,
            to,
            transition,
            occurred_at: cmd.occurred_at,
        })
    }

    fn handle_delete(&self, cmd: &DeleteProcess) -> DomainResult<Vec<ProcessEvent>> {
        self.ensure_visible(cmd.company_id, cmd.process_id)?;

        Ok(vec![ProcessEvent::ProcessDeleted(ProcessDeleted {
            company_id: cmd.company_id,
            process_id: cmd.process_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
