//! Transaction primitives.
//!
//! A `Transaction` is a recorded income, expense or transfer. It changes one
//! account balance (income/expense) or two (transfer) via the deltas computed
//! in [`legs`](crate::legs).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{Amount, EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidField(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub household_id: Uuid,
    pub kind: TransactionKind,
    pub description: String,
    /// Always a positive magnitude; the sign comes from `kind`.
    pub amount: Amount,
    pub account_id: Uuid,
    /// Present if and only if `kind` is `Transfer`.
    pub destination_account_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub transacted_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub kind: String,
    pub description: String,
    /// Amount in ten-thousandths (see [`Amount::to_units`]).
    pub amount: i64,
    pub account_id: String,
    pub destination_account_id: Option<String>,
    pub tags: Json,
    pub note: Option<String>,
    pub transacted_at: DateTimeUtc,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Source,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::DestinationAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Destination,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Source.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Transaction> for ActiveModel {
    type Error = EngineError;

    fn try_from(tx: &Transaction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(tx.id.to_string()),
            household_id: ActiveValue::Set(tx.household_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            amount: ActiveValue::Set(tx.amount.to_units()?),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            destination_account_id: ActiveValue::Set(
                tx.destination_account_id.map(|id| id.to_string()),
            ),
            tags: ActiveValue::Set(tags_to_json(&tx.tags)),
            note: ActiveValue::Set(tx.note.clone()),
            transacted_at: ActiveValue::Set(tx.transacted_at),
            created_by: ActiveValue::Set(tx.created_by.to_string()),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        })
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            household_id: parse_uuid(&model.household_id, "household")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            description: model.description,
            amount: Amount::from_units(model.amount),
            account_id: parse_uuid(&model.account_id, "account")?,
            destination_account_id: model
                .destination_account_id
                .as_deref()
                .map(|id| parse_uuid(id, "account"))
                .transpose()?,
            tags: tags_from_json(model.tags)?,
            note: model.note,
            transacted_at: model.transacted_at,
            created_by: parse_uuid(&model.created_by, "user")?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

pub(crate) fn tags_to_json(tags: &[String]) -> Json {
    Json::Array(tags.iter().cloned().map(Json::String).collect())
}

fn tags_from_json(value: Json) -> ResultEngine<Vec<String>> {
    match value {
        Json::Null => Ok(Vec::new()),
        other => serde_json::from_value(other)
            .map_err(|err| EngineError::Database(DbErr::Type(format!("invalid tags: {err}")))),
    }
}
