//! The `expenses` collection.

crate::table::record_entity!("expenses", Expense);
