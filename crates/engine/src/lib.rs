//! Income and expense records over a relational store.
//!
//! [`Engine`] is the only entry point: it owns the database handle and
//! exposes record CRUD ([`Engine::add`], [`Engine::list`], [`Engine::get`],
//! [`Engine::update`], [`Engine::delete`]) and the aggregations
//! ([`Engine::summary`], [`Engine::transactions`]).

pub use error::EngineError;
pub use ops::{Engine, EngineBuilder};
pub use records::{
    Amount, DEFAULT_ICON, Record, RecordKind, RecordNew, RecordPatch, Summary, TransactionEntry,
    UpdateOutcome,
};

mod error;
mod expenses;
mod incomes;
mod ops;
mod records;
mod table;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
