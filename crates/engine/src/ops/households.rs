use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Household, HouseholdRole, ResultEngine, User, household_members, households,
    users,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(EngineError::InvalidField(format!("invalid email: {value}"))),
    }
}

async fn require_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> ResultEngine<users::Model> {
    users::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound("user".to_string()))
}

async fn require_household<C: ConnectionTrait>(
    db: &C,
    household_id: Uuid,
) -> ResultEngine<households::Model> {
    households::Entity::find_by_id(household_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound("household".to_string()))
}

async fn insert_member<C: ConnectionTrait>(
    db: &C,
    household_id: Uuid,
    user_id: Uuid,
    role: HouseholdRole,
) -> ResultEngine<()> {
    household_members::ActiveModel {
        household_id: ActiveValue::Set(household_id.to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        role: ActiveValue::Set(role.as_str().to_string()),
        joined_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::ExistingKey("membership".to_string())
        }
        _ => EngineError::Database(err),
    })?;
    Ok(())
}

impl Engine {
    /// Registers a user identity.
    pub async fn new_user(&self, email: &str, name: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        let name = normalize_required_name(name, "user name")?;
        let taken = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.database)
            .await?
            .is_some();
        if taken {
            return Err(EngineError::ExistingKey(format!("user {email}")));
        }
        let model = users::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            email: ActiveValue::Set(email.clone()),
            name: ActiveValue::Set(name),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                EngineError::ExistingKey(format!("user {email}"))
            }
            _ => EngineError::Database(err),
        })?;
        let user = User::try_from(model)?;
        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Creates a household owned (and joined) by `owner_id`.
    pub async fn new_household(&self, name: &str, owner_id: Uuid) -> ResultEngine<Household> {
        let name = normalize_required_name(name, "household name")?;
        let household = with_tx!(self, |db_tx| {
            async {
                require_user(&db_tx, owner_id).await?;
                let model = households::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4().to_string()),
                    name: ActiveValue::Set(name),
                    owner_id: ActiveValue::Set(owner_id.to_string()),
                    created_at: ActiveValue::Set(Utc::now()),
                }
                .insert(&db_tx)
                .await?;
                let household = Household::try_from(model)?;
                insert_member(&db_tx, household.id, owner_id, HouseholdRole::Owner).await?;
                Ok::<_, EngineError>(household)
            }
            .await
        })?;
        tracing::info!(household_id = %household.id, owner_id = %owner_id, "household created");
        Ok(household)
    }

    /// Adds `user_id` to a household as a plain member.
    pub async fn add_member(&self, household_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            async {
                require_household(&db_tx, household_id).await?;
                require_user(&db_tx, user_id).await?;
                let existing = household_members::Entity::find_by_id((
                    household_id.to_string(),
                    user_id.to_string(),
                ))
                .one(&db_tx)
                .await?;
                if existing.is_some() {
                    return Err(EngineError::ExistingKey("membership".to_string()));
                }
                insert_member(&db_tx, household_id, user_id, HouseholdRole::Member).await
            }
            .await
        })?;
        tracing::info!(household_id = %household_id, user_id = %user_id, "member added");
        Ok(())
    }

    /// Whether `user_id` belongs to the household.
    pub async fn is_member(&self, household_id: Uuid, user_id: Uuid) -> ResultEngine<bool> {
        let found = household_members::Entity::find_by_id((
            household_id.to_string(),
            user_id.to_string(),
        ))
        .one(&self.database)
        .await?;
        Ok(found.is_some())
    }

    /// Households `user_id` belongs to, oldest first.
    pub async fn households_for_user(&self, user_id: Uuid) -> ResultEngine<Vec<Household>> {
        let ids: Vec<String> = household_members::Entity::find()
            .filter(household_members::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|member| member.household_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        households::Entity::find()
            .filter(households::Column::Id.is_in(ids))
            .order_by_asc(households::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Household::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_lowercased_and_checked() {
        assert_eq!(normalize_email(" Ana@Example.COM ").unwrap(), "ana@example.com");
        assert!(normalize_email("ana").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ana@").is_err());
    }
}
