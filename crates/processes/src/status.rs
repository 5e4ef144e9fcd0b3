//! Process status set and the transition table.
//!
//! [`TransitionTable`] is the only place that decides which status moves are
//! legal. Guards that need data beyond the current status (payment balances,
//! external policy) are layered on top by the caller.

use serde::{Deserialize, Serialize};

use licitacao_core::{DomainError, DomainResult};

/// Lifecycle status of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessStatus {
    #[serde(rename = "participacao")]
    Participation,
    #[serde(rename = "julgamento_habilitacao")]
    Judging,
    /// Legacy "won" status; behaves like `Execution`.
    #[serde(rename = "vencido")]
    Won,
    #[serde(rename = "execucao")]
    Execution,
    #[serde(rename = "pagamento")]
    Payment,
    #[serde(rename = "encerramento")]
    Closed,
    #[serde(rename = "perdido")]
    Lost,
    #[serde(rename = "arquivado")]
    Archived,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 8] = [
        ProcessStatus::Participation,
        ProcessStatus::Judging,
        ProcessStatus::Won,
        ProcessStatus::Execution,
        ProcessStatus::Payment,
        ProcessStatus::Closed,
        ProcessStatus::Lost,
        ProcessStatus::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessStatus::Participation => "participacao",
            ProcessStatus::Judging => "julgamento_habilitacao",
            ProcessStatus::Won => "vencido",
            ProcessStatus::Execution => "execucao",
            ProcessStatus::Payment => "pagamento",
            ProcessStatus::Closed => "encerramento",
            ProcessStatus::Lost => "perdido",
            ProcessStatus::Archived => "arquivado",
        }
    }

    /// No further "mark as won" is possible from here.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProcessStatus::Closed | ProcessStatus::Lost | ProcessStatus::Archived
        )
    }

    /// `isEmExecucao`: execution, including the legacy `vencido` status.
    pub fn is_in_execution(self) -> bool {
        matches!(self, ProcessStatus::Execution | ProcessStatus::Won)
    }

    /// Descriptive fields are read-only from execution onwards.
    pub fn locks_details(self) -> bool {
        matches!(
            self,
            ProcessStatus::Won
                | ProcessStatus::Execution
                | ProcessStatus::Payment
                | ProcessStatus::Closed
                | ProcessStatus::Archived
        )
    }
}

impl core::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named move in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessTransition {
    MoveToJudging,
    MarkWon,
    EnterPayment,
    ConfirmPayment,
    Finalize,
    MarkLost,
    Archive,
}

impl ProcessTransition {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessTransition::MoveToJudging => "move_to_judging",
            ProcessTransition::MarkWon => "mark_won",
            ProcessTransition::EnterPayment => "enter_payment",
            ProcessTransition::ConfirmPayment => "confirm_payment",
            ProcessTransition::Finalize => "finalize",
            ProcessTransition::MarkLost => "mark_lost",
            ProcessTransition::Archive => "archive",
        }
    }

    /// Moves that must also be cleared by the external status policy.
    pub fn requires_policy(self) -> bool {
        matches!(self, ProcessTransition::MarkLost | ProcessTransition::Archive)
    }
}

impl core::fmt::Display for ProcessTransition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    To(ProcessStatus),
    Stay,
}

#[derive(Debug, Clone, Copy)]
enum Sources {
    Only(&'static [ProcessStatus]),
    NotTerminal,
    AllExcept(ProcessStatus),
}

impl Sources {
    fn contains(self, status: ProcessStatus) -> bool {
        match self {
            Sources::Only(list) => list.contains(&status),
            Sources::NotTerminal => !status.is_terminal(),
            Sources::AllExcept(excluded) => status != excluded,
        }
    }
}

use ProcessStatus as S;

const RULES: &[(ProcessTransition, Sources, Target)] = &[
    (
        ProcessTransition::MoveToJudging,
        Sources::Only(&[S::Participation, S::Judging]),
        Target::To(S::Judging),
    ),
    (
        ProcessTransition::MarkWon,
        Sources::NotTerminal,
        Target::To(S::Execution),
    ),
    (
        ProcessTransition::EnterPayment,
        Sources::Only(&[S::Execution, S::Won]),
        Target::To(S::Payment),
    ),
    (
        ProcessTransition::ConfirmPayment,
        Sources::Only(&[S::Execution, S::Won]),
        Target::Stay,
    ),
    (
        ProcessTransition::Finalize,
        Sources::Only(&[S::Execution, S::Won, S::Payment]),
        Target::To(S::Closed),
    ),
    (
        ProcessTransition::MarkLost,
        Sources::Only(&[S::Participation, S::Judging, S::Won, S::Execution, S::Payment]),
        Target::To(S::Lost),
    ),
    (
        ProcessTransition::Archive,
        Sources::AllExcept(S::Archived),
        Target::To(S::Archived),
    ),
];

/// The table of legal status moves.
pub struct TransitionTable;

impl TransitionTable {
    /// Status reached by applying `transition` in `from`, if legal.
    pub fn target(from: ProcessStatus, transition: ProcessTransition) -> Option<ProcessStatus> {
        RULES
            .iter()
            .find(|(t, sources, _)| *t == transition && sources.contains(from))
            .map(|(_, _, target)| match target {
                Target::To(to) => *to,
                Target::Stay => from,
            })
    }

    pub fn allows(from: ProcessStatus, transition: ProcessTransition) -> bool {
        Self::target(from, transition).is_some()
    }

    /// Like [`TransitionTable::target`], but an illegal move is an invariant violation.
    pub fn check(from: ProcessStatus, transition: ProcessTransition) -> DomainResult<ProcessStatus> {
        Self::target(from, transition).ok_or_else(|| {
            DomainError::invariant(format!(
                "transition {transition} not allowed from status {from}"
            ))
        })
    }

    /// Every transition legal from `from`.
    pub fn available(from: ProcessStatus) -> Vec<ProcessTransition> {
        RULES
            .iter()
            .filter(|(_, sources, _)| sources.contains(from))
            .map(|(t, _, _)| *t)
            .collect()
    }
}
