//! `licitacao-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the procurement crates
//! (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, CompanyId};
pub use money::{MONEY_SCALE, mul_money, round_money, sum_money};
pub use value_object::ValueObject;
