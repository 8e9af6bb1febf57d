//! Meal rule model.
//!
//! A meal rule is a named filter selection saved by a household, used to
//! pick candidate recipes when planning meals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::filter::FilterConditions;

/// Saved meal rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRule {
    pub id: Uuid,
    pub household_id: Uuid,
    pub name: String,
    pub conditions: FilterConditions,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct MealRuleRow {
    id: Uuid,
    household_id: Uuid,
    name: String,
    conditions: Json<FilterConditions>,
    created_at: DateTime<Utc>,
}

impl From<MealRuleRow> for MealRule {
    fn from(row: MealRuleRow) -> Self {
        Self {
            id: row.id,
            household_id: row.household_id,
            name: row.name,
            conditions: row.conditions.0,
            created_at: row.created_at,
        }
    }
}

impl MealRule {
    /// List a household's meal rules by name.
    pub async fn list_for_household(
        pool: &PgPool,
        household_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, MealRuleRow>(
            r#"
            SELECT id, household_id, name, conditions, created_at
            FROM meal_rule
            WHERE household_id = $1
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(household_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(MealRule::from).collect())
    }

    /// Find a meal rule by ID within a household.
    pub async fn find(
        pool: &PgPool,
        household_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, MealRuleRow>(
            r#"
            SELECT id, household_id, name, conditions, created_at
            FROM meal_rule
            WHERE household_id = $1 AND id = $2
            "#,
        )
        .bind(household_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(MealRule::from))
    }
}
