use sea_orm::{
    ColumnTrait, DatabaseConnection, IntoActiveModel, QueryFilter, QueryOrder, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    DEFAULT_ICON, EngineError, Record, RecordKind, RecordNew, RecordPatch, ResultEngine,
    UpdateOutcome,
    table::{RecordTable, on_table},
    util::{parse_record_id, validate_business_date},
};

use super::Engine;

impl Engine {
    /// Inserts a new record, stamping id, owner and creation time.
    pub async fn add(
        &self,
        kind: RecordKind,
        new: RecordNew,
        owner: Option<&str>,
    ) -> ResultEngine<Record> {
        let owner = self.scope(owner)?;
        let record = Record {
            id: Uuid::new_v4(),
            source: new.source,
            amount: new.amount.coerce()?,
            date: validate_business_date(&new.date, self.lenient_dates)?,
            icon: icon_or_default(new.icon, None),
            user_email: owner.map(ToString::to_string),
            created_at: self.clock.stamp(),
        };

        on_table!(kind, insert_in(&self.database, &record))?;
        tracing::debug!(kind = kind.as_str(), id = %record.id, "record added");
        Ok(record)
    }

    /// Lists the records in scope, newest first.
    pub async fn list(&self, kind: RecordKind, owner: Option<&str>) -> ResultEngine<Vec<Record>> {
        let owner = self.scope(owner)?;
        on_table!(kind, list_in(&self.database, owner))
    }

    /// Returns a single record in scope.
    pub async fn get(
        &self,
        kind: RecordKind,
        id: &str,
        owner: Option<&str>,
    ) -> ResultEngine<Record> {
        let owner = self.scope(owner)?;
        let id = parse_record_id(id)?;
        on_table!(kind, get_in(&self.database, id, owner))
    }

    /// Replaces the mutable fields of a record.
    ///
    /// `id`, `created_at` and `user_email` are never touched. An update that
    /// would not change anything reports [`UpdateOutcome::Unchanged`] and
    /// skips the write.
    pub async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        patch: RecordPatch,
        owner: Option<&str>,
    ) -> ResultEngine<UpdateOutcome> {
        let owner = self.scope(owner)?;
        let id = parse_record_id(id)?;
        let outcome = on_table!(
            kind,
            update_in(&self.database, id, &patch, owner, self.lenient_dates)
        )?;
        tracing::debug!(kind = kind.as_str(), %id, ?outcome, "record updated");
        Ok(outcome)
    }

    /// Removes a record.
    pub async fn delete(&self, kind: RecordKind, id: &str, owner: Option<&str>) -> ResultEngine<()> {
        let owner = self.scope(owner)?;
        let id = parse_record_id(id)?;
        on_table!(kind, delete_in(&self.database, id, owner))?;
        tracing::debug!(kind = kind.as_str(), %id, "record deleted");
        Ok(())
    }
}

fn icon_or_default(icon: Option<String>, previous: Option<&str>) -> String {
    icon.map(|icon| icon.trim().to_string())
        .filter(|icon| !icon.is_empty())
        .or_else(|| previous.map(ToString::to_string))
        .unwrap_or_else(|| DEFAULT_ICON.to_string())
}

fn not_found(kind: RecordKind, id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("{} {id}", kind.as_str()))
}

/// Computes the record resulting from applying `patch` to `current`.
fn apply_patch(current: &Record, patch: &RecordPatch, lenient_dates: bool) -> ResultEngine<Record> {
    let mut next = current.clone();
    if let Some(source) = &patch.source {
        next.source = source.clone();
    }
    if let Some(amount) = &patch.amount {
        next.amount = amount.coerce()?;
    }
    if let Some(date) = &patch.date {
        next.date = validate_business_date(date, lenient_dates)?;
    }
    next.icon = icon_or_default(patch.icon.clone(), Some(current.icon.as_str()));
    Ok(next)
}

pub(crate) async fn list_in<E: RecordTable>(
    db: &DatabaseConnection,
    owner: Option<&str>,
) -> ResultEngine<Vec<Record>> {
    let mut query = E::find();
    if let Some(owner) = owner {
        query = query.filter(E::owner_column().eq(owner));
    }
    let models = query
        .order_by_desc(E::created_at_column())
        .order_by_desc(E::id_column())
        .all(db)
        .await?;

    models.into_iter().map(E::into_record).collect()
}

async fn find_in<E: RecordTable>(
    db: &DatabaseConnection,
    id: Uuid,
    owner: Option<&str>,
) -> ResultEngine<Option<Record>> {
    let mut query = E::find().filter(E::id_column().eq(id.to_string()));
    if let Some(owner) = owner {
        query = query.filter(E::owner_column().eq(owner));
    }
    query.one(db).await?.map(E::into_record).transpose()
}

async fn get_in<E: RecordTable>(
    db: &DatabaseConnection,
    id: Uuid,
    owner: Option<&str>,
) -> ResultEngine<Record> {
    find_in::<E>(db, id, owner)
        .await?
        .ok_or_else(|| not_found(E::KIND, id))
}

async fn insert_in<E>(db: &DatabaseConnection, record: &Record) -> ResultEngine<()>
where
    E: RecordTable,
    E::Model: IntoActiveModel<E::ActiveModel>,
{
    E::insert(E::new_active(record))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn update_in<E: RecordTable>(
    db: &DatabaseConnection,
    id: Uuid,
    patch: &RecordPatch,
    owner: Option<&str>,
    lenient_dates: bool,
) -> ResultEngine<UpdateOutcome> {
    let current = get_in::<E>(db, id, owner).await?;
    let next = apply_patch(&current, patch, lenient_dates)?;
    if next == current {
        return Ok(UpdateOutcome::Unchanged);
    }

    let mut query = E::update_many()
        .col_expr(E::source_column(), Expr::value(next.source))
        .col_expr(E::amount_column(), Expr::value(next.amount))
        .col_expr(E::date_column(), Expr::value(next.date))
        .col_expr(E::icon_column(), Expr::value(next.icon))
        .filter(E::id_column().eq(id.to_string()));
    if let Some(owner) = owner {
        query = query.filter(E::owner_column().eq(owner));
    }

    // Removed between the read and the write.
    if query.exec(db).await?.rows_affected == 0 {
        return Err(not_found(E::KIND, id));
    }
    Ok(UpdateOutcome::Modified)
}

async fn delete_in<E: RecordTable>(
    db: &DatabaseConnection,
    id: Uuid,
    owner: Option<&str>,
) -> ResultEngine<()> {
    let mut query = E::delete_many().filter(E::id_column().eq(id.to_string()));
    if let Some(owner) = owner {
        query = query.filter(E::owner_column().eq(owner));
    }
    if query.exec(db).await?.rows_affected == 0 {
        return Err(not_found(E::KIND, id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::Amount;

    fn record() -> Record {
        Record {
            id: Uuid::new_v4(),
            source: "Salary".to_string(),
            amount: 100.0,
            date: "2024-01-01".to_string(),
            icon: "💼".to_string(),
            user_email: Some("alice@example.com".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let current = record();
        let next = apply_patch(&current, &RecordPatch::default(), false).unwrap();
        assert_eq!(next, current);
    }

    #[test]
    fn patch_replaces_mutable_fields_only() {
        let current = record();
        let patch = RecordPatch {
            source: Some("Bonus".to_string()),
            amount: Some(Amount::from("250.5")),
            date: Some("2024-03-01".to_string()),
            icon: Some("🎉".to_string()),
        };
        let next = apply_patch(&current, &patch, false).unwrap();
        assert_eq!(next.source, "Bonus");
        assert_eq!(next.amount, 250.5);
        assert_eq!(next.date, "2024-03-01");
        assert_eq!(next.icon, "🎉");
        assert_eq!(next.id, current.id);
        assert_eq!(next.created_at, current.created_at);
        assert_eq!(next.user_email, current.user_email);
    }

    #[test]
    fn blank_icon_keeps_previous() {
        let current = record();
        let patch = RecordPatch {
            icon: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(apply_patch(&current, &patch, false).unwrap().icon, "💼");
    }

    #[test]
    fn patch_rejects_bad_amount_and_date() {
        let current = record();
        let bad_amount = RecordPatch {
            amount: Some(Amount::from("lots")),
            ..Default::default()
        };
        assert!(matches!(
            apply_patch(&current, &bad_amount, false),
            Err(EngineError::InvalidAmount(_))
        ));

        let bad_date = RecordPatch {
            date: Some("someday".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            apply_patch(&current, &bad_date, false),
            Err(EngineError::InvalidDate(_))
        ));
        assert!(apply_patch(&current, &bad_date, true).is_ok());
    }

    #[test]
    fn missing_icon_falls_back_to_default() {
        assert_eq!(icon_or_default(None, None), DEFAULT_ICON);
        assert_eq!(icon_or_default(Some("🍕".to_string()), None), "🍕");
    }
}
