//! The `incomes` collection.

crate::table::record_entity!("incomes", Income);
