//! The module contains `Account` struct and its database entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{Amount, Currency, EngineError, util::parse_uuid};

/// What kind of store of value an account represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
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

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "card" => Ok(Self::Card),
            "deposit" => Ok(Self::Deposit),
            "cash" => Ok(Self::Cash),
            other => Err(EngineError::InvalidField(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

/// An account.
///
/// An account is a named store of value (a card, a deposit or cash) owned by
/// a household. Its balance is set once at creation and afterwards only moves
/// by the signed deltas of the transactions referencing it.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub household_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance: Amount,
    pub currency: Currency,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub kind: String,
    /// Balance in ten-thousandths (see [`Amount::to_units`]).
    pub balance: i64,
    pub currency: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::households::Entity",
        from = "Column::HouseholdId",
        to = "super::households::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Households,
}

impl Related<super::households::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Households.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Account> for ActiveModel {
    type Error = EngineError;

    fn try_from(value: &Account) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(value.id.to_string()),
            household_id: ActiveValue::Set(value.household_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            balance: ActiveValue::Set(value.balance.to_units()?),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            created_by: ActiveValue::Set(value.created_by.to_string()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        })
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            household_id: parse_uuid(&model.household_id, "household")?,
            name: model.name,
            kind: AccountKind::try_from(model.kind.as_str())?,
            balance: Amount::from_units(model.balance),
            currency: Currency::try_from(model.currency.as_str())?,
            created_by: parse_uuid(&model.created_by, "user")?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
