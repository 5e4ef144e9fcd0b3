//! Financial valuation of process items and process-level balances.
//!
//! Everything here is a pure function of its inputs: callers load a snapshot,
//! compute, and persist the result in a separate explicit step.
//!
//! - [`registry`]: linkages of an item, by instrument kind.
//! - [`ledger`]: invoice sums reachable through an item's linkages.
//! - [`item`]: derived financial figures of one item.
//! - [`balance`]: process-level rollups.
//! - [`finalization`]: closing eligibility checks.

pub mod balance;
pub mod finalization;
pub mod item;
pub mod ledger;
pub mod registry;

#[cfg(test)]
pub(crate) mod fixtures;

pub use balance::{
    AwardedBalance, BalanceAggregator, BalanceSummary, BoundBalance, CommittedBalance,
    ProcessBalances, UnboundBalance,
};
pub use finalization::{BlockingItem, FinalizationCheck, settled_for_closing};
pub use item::{ItemSnapshot, ItemValuation, ItemValuationEngine};
pub use ledger::InvoiceLedgerView;
pub use registry::{CapacityCheck, LinkageRegistry};
