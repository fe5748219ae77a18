//! Common surface of the `incomes` and `expenses` entities, so record
//! operations are written once and dispatched on `RecordKind`. The entities
//! themselves come from `record_entity!`.

use sea_orm::EntityTrait;

use crate::{Record, RecordKind, ResultEngine};

pub(crate) trait RecordTable: EntityTrait {
    const KIND: RecordKind;

    fn id_column() -> Self::Column;
    fn source_column() -> Self::Column;
    fn amount_column() -> Self::Column;
    fn date_column() -> Self::Column;
    fn icon_column() -> Self::Column;
    fn owner_column() -> Self::Column;
    fn created_at_column() -> Self::Column;

    fn new_active(record: &Record) -> Self::ActiveModel;
    fn into_record(model: Self::Model) -> ResultEngine<Record>;
}

/// Run a generic record operation against the table selected by `kind`.
macro_rules! on_table {
    ($kind:expr, $op:ident ( $($arg:expr),* $(,)? )) => {
        match $kind {
            $crate::RecordKind::Income => $op::<$crate::incomes::Entity>($($arg),*).await,
            $crate::RecordKind::Expense => $op::<$crate::expenses::Entity>($($arg),*).await,
        }
    };
}

pub(crate) use on_table;

/// Declare the sea-orm entity of one record collection and its
/// [`RecordTable`] impl. Both collections share every column.
macro_rules! record_entity {
    ($table:tt, $kind:ident) => {
        use sea_orm::{ActiveValue, entity::prelude::*};

        use $crate::{
            Record, RecordKind, ResultEngine, table::RecordTable, util::parse_record_id,
        };

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = $table)]
        pub struct Model {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: String,
            pub source: String,
            #[sea_orm(column_type = "Double")]
            pub amount: f64,
            pub date: String,
            pub icon: String,
            pub user_email: Option<String>,
            pub created_at: DateTimeUtc,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}

        impl From<&Record> for ActiveModel {
            fn from(record: &Record) -> Self {
                Self {
                    id: ActiveValue::Set(record.id.to_string()),
                    source: ActiveValue::Set(record.source.clone()),
                    amount: ActiveValue::Set(record.amount),
                    date: ActiveValue::Set(record.date.clone()),
                    icon: ActiveValue::Set(record.icon.clone()),
                    user_email: ActiveValue::Set(record.user_email.clone()),
                    created_at: ActiveValue::Set(record.created_at),
                }
            }
        }

        impl TryFrom<Model> for Record {
            type Error = $crate::EngineError;

            fn try_from(model: Model) -> ResultEngine<Self> {
                Ok(Self {
                    id: parse_record_id(&model.id)?,
                    source: model.source,
                    amount: model.amount,
                    date: model.date,
                    icon: model.icon,
                    user_email: model.user_email,
                    created_at: model.created_at,
                })
            }
        }

        impl RecordTable for Entity {
            const KIND: RecordKind = RecordKind::$kind;

            fn id_column() -> Column {
                Column::Id
            }
            fn source_column() -> Column {
                Column::Source
            }
            fn amount_column() -> Column {
                Column::Amount
            }
            fn date_column() -> Column {
                Column::Date
            }
            fn icon_column() -> Column {
                Column::Icon
            }
            fn owner_column() -> Column {
                Column::UserEmail
            }
            fn created_at_column() -> Column {
                Column::CreatedAt
            }

            fn new_active(record: &Record) -> ActiveModel {
                ActiveModel::from(record)
            }

            fn into_record(model: Model) -> ResultEngine<Record> {
                Record::try_from(model)
            }
        }
    };
}

pub(crate) use record_entity;
