use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One page of a listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum AccountKind {
        Card,
        Deposit,
        Cash,
    }

    impl AccountKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Card => "card",
                Self::Deposit => "deposit",
                Self::Cash => "cash",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountKind,
        /// Opening balance as a decimal string (`"0"` when omitted).
        #[serde(default)]
        pub balance: Option<String>,
        /// Three-letter code (`UAH` when omitted).
        #[serde(default)]
        pub currency: Option<String>,
    }

    /// Partial update; the balance is never accepted here.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<AccountKind>,
        pub currency: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub household_id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountKind,
        /// Decimal string with two fractional digits.
        pub balance: String,
        pub currency: String,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum TransactionKind {
        Income,
        Expense,
        Transfer,
    }

    /// Body of both create and update: an update replaces every field.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub description: String,
        /// Positive decimal string, e.g. `"12.50"`.
        pub amount: String,
        pub account_id: Uuid,
        #[serde(default)]
        pub destination_account_id: Option<Uuid>,
        #[serde(default)]
        pub tags: Vec<String>,
        #[serde(default)]
        pub note: Option<String>,
        /// RFC 3339 timestamp.
        pub transacted_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub household_id: Uuid,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub description: String,
        pub amount: String,
        pub account_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub destination_account_id: Option<Uuid>,
        pub tags: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub note: Option<String>,
        pub transacted_at: DateTime<Utc>,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Query string of `GET /api/transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        /// Inclusive lower bound on `transacted_at`.
        pub from: Option<DateTime<FixedOffset>>,
        /// Inclusive upper bound on `transacted_at`.
        pub to: Option<DateTime<FixedOffset>>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        /// Matches the source or the destination account.
        pub account_id: Option<Uuid>,
        pub limit: Option<i64>,
        pub offset: Option<i64>,
    }

    pub type TransactionList = Page<TransactionView>;
}

pub mod export {
    use super::*;

    /// Query string of `GET /api/export/csv`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExportQuery {
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
    }
}
