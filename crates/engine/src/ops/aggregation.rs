use std::cmp::Reverse;

use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, QuerySelect};

use crate::{
    EngineError, Record, RecordKind, ResultEngine, Summary, TransactionEntry, expenses, incomes,
    table::RecordTable, util::date_sort_key,
};

use super::{Engine, records::list_in};

impl Engine {
    /// Totals of incomes and expenses in scope, and their difference.
    ///
    /// The two sums run concurrently; an empty scope sums to zero.
    pub async fn summary(&self, owner: Option<&str>) -> ResultEngine<Summary> {
        let owner = self.scope(owner)?;
        let (total_income, total_expense) = tokio::try_join!(
            sum_in::<incomes::Entity>(&self.database, owner),
            sum_in::<expenses::Entity>(&self.database, owner),
        )?;

        let summary = Summary::new(total_income, total_expense);
        checked_total("balance", Some(summary.balance))?;
        Ok(summary)
    }

    /// Incomes and expenses in scope merged into one feed, most recent
    /// business date first.
    pub async fn transactions(&self, owner: Option<&str>) -> ResultEngine<Vec<TransactionEntry>> {
        let owner = self.scope(owner)?;
        let (incomes, expenses) = tokio::try_join!(
            list_in::<incomes::Entity>(&self.database, owner),
            list_in::<expenses::Entity>(&self.database, owner),
        )?;

        Ok(merge_by_date(incomes, expenses))
    }
}

async fn sum_in<E: RecordTable>(db: &DatabaseConnection, owner: Option<&str>) -> ResultEngine<f64> {
    let mut query = E::find()
        .select_only()
        .column_as(E::amount_column().sum(), "total");
    if let Some(owner) = owner {
        query = query.filter(E::owner_column().eq(owner));
    }
    let total: Option<Option<f64>> = query.into_tuple::<Option<f64>>().one(db).await?;

    checked_total(E::KIND.as_str(), total.flatten())
}

/// An empty scope totals zero; a non-finite total is an error.
fn checked_total(label: &str, total: Option<f64>) -> ResultEngine<f64> {
    match total {
        None => Ok(0.0),
        Some(total) if total.is_finite() => Ok(total),
        Some(_) => Err(EngineError::TotalOverflow(format!(
            "{label} total does not fit in a finite number"
        ))),
    }
}

/// Concatenate incomes then expenses, tag them, and order by business date
/// descending. Equal dates keep concatenation order and unparsable dates go
/// last.
fn merge_by_date(incomes: Vec<Record>, expenses: Vec<Record>) -> Vec<TransactionEntry> {
    let mut entries: Vec<TransactionEntry> = incomes
        .into_iter()
        .map(|record| TransactionEntry {
            kind: RecordKind::Income,
            record,
        })
        .chain(expenses.into_iter().map(|record| TransactionEntry {
            kind: RecordKind::Expense,
            record,
        }))
        .collect();

    entries.sort_by_cached_key(|entry| Reverse(date_sort_key(&entry.record.date)));
    entries
}
