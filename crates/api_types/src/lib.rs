use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod record {
    use super::*;

    /// Amount as sent by clients: a JSON number or a numeric string.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum Amount {
        Number(f64),
        Text(String),
    }

    /// Body of `POST /incomes` and `POST /expenses`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordNew {
        pub source: String,
        pub amount: Amount,
        pub date: String,
        pub icon: Option<String>,
        /// Alias of `icon`; wins when both are present.
        pub emoji: Option<String>,
        /// Owner used when no bearer token and no `email` query are given.
        pub user_email: Option<String>,
    }

    /// Body of `PUT /incomes/{id}` and `PUT /expenses/{id}`.
    ///
    /// Absent fields keep their stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordUpdate {
        pub source: Option<String>,
        pub amount: Option<Amount>,
        pub date: Option<String>,
        pub icon: Option<String>,
        pub emoji: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordView {
        pub id: Uuid,
        pub source: String,
        pub amount: f64,
        pub date: String,
        pub icon: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub user_email: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;
    use crate::record::RecordView;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RecordKind {
        Income,
        Expense,
    }

    /// One element of `GET /transactions`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionView {
        #[serde(rename = "type")]
        pub kind: RecordKind,
        #[serde(flatten)]
        pub record: RecordView,
    }
}

pub mod summary {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Summary {
        pub total_income: f64,
        pub total_expense: f64,
        pub balance: f64,
    }
}

pub mod response {
    use super::*;

    /// Outcome of updates, deletes and failed requests.
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct MessageResponse {
        pub success: bool,
        pub message: String,
        /// Only set by updates: whether any field actually changed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub modified: Option<bool>,
    }

    impl MessageResponse {
        pub fn ok(message: impl Into<String>) -> Self {
            Self {
                success: true,
                message: message.into(),
                modified: None,
            }
        }

        pub fn failed(message: impl Into<String>) -> Self {
            Self {
                success: false,
                message: message.into(),
                modified: None,
            }
        }
    }
}

pub mod query {
    use super::*;

    /// `?email=` filter accepted by every owner-scoped route.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EmailQuery {
        pub email: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::record::*;
    use super::transaction::*;

    #[test]
    fn record_new_accepts_string_amount_and_emoji() {
        let body = r#"{"source":"Salary","amount":"1200.50","date":"2024-01-31","emoji":"💼"}"#;
        let parsed: RecordNew = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.amount, Amount::Text("1200.50".to_string()));
        assert_eq!(parsed.emoji.as_deref(), Some("💼"));
        assert!(parsed.icon.is_none());
        assert!(parsed.user_email.is_none());
    }

    #[test]
    fn transaction_view_is_flat_with_type_tag() {
        let view = TransactionView {
            kind: RecordKind::Expense,
            record: RecordView {
                id: uuid::Uuid::nil(),
                source: "Rent".to_string(),
                amount: 800.0,
                date: "2024-02-01".to_string(),
                icon: "🏠".to_string(),
                user_email: Some("alice@example.com".to_string()),
                created_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            },
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["source"], "Rent");
        assert_eq!(json["userEmail"], "alice@example.com");
        assert!(json.get("createdAt").is_some());
    }
}
