//! Record primitives.
//!
//! Incomes and expenses share the same shape: a `Record` lives in one of two
//! collections selected by its `RecordKind`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Icon stored when the caller does not provide one.
pub const DEFAULT_ICON: &str = "💰";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// Amount as it arrives on the wire: either a number or its textual form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Coerce to a finite `f64`.
    pub fn coerce(&self) -> ResultEngine<f64> {
        let value = match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => parse_decimal(text),
        };

        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| EngineError::InvalidAmount(format!("{self} is not a number")))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "\"{text}\""),
        }
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return Some(value);
    }
    // "10,50" → 10.50; a comma is only a decimal separator when it is the only one.
    if trimmed.matches(',').count() == 1 && !trimmed.contains('.') {
        return trimmed.replace(',', ".").parse::<f64>().ok();
    }
    None
}

/// A persisted income or expense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub source: String,
    pub amount: f64,
    pub date: String,
    pub icon: String,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for a new record.
#[derive(Clone, Debug)]
pub struct RecordNew {
    pub source: String,
    pub amount: Amount,
    pub date: String,
    pub icon: Option<String>,
}

/// Input for an update. Absent fields keep their stored value.
#[derive(Clone, Debug, Default)]
pub struct RecordPatch {
    pub source: Option<String>,
    pub amount: Option<Amount>,
    pub date: Option<String>,
    pub icon: Option<String>,
}

/// Result of an update on an existing record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// At least one field changed and was written.
    Modified,
    /// The record exists but every field already had the requested value.
    Unchanged,
}

/// Totals over the records in scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
}

impl Summary {
    pub fn new(total_income: f64, total_expense: f64) -> Self {
        Self {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }
}

/// One element of the merged income/expense feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub kind: RecordKind,
    pub record: Record,
}
