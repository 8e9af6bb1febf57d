//! Household model.
//!
//! A household is the multi-tenant boundary: every facet, recipe and meal
//! rule belongs to exactly one household, and every recipe query is scoped
//! to one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Household language. Selects the text-search configuration used for
/// recipe name matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hu,
}

impl Language {
    /// Parse a stored language code. Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code {
            "hu" => Language::Hu,
            _ => Language::En,
        }
    }

    /// Stored language code.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hu => "hu",
        }
    }

    /// PostgreSQL text search configuration for this language.
    pub fn search_config(self) -> &'static str {
        match self {
            Language::En => "english",
            Language::Hu => "hungarian",
        }
    }
}

/// Household record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: Uuid,
    pub name: String,
    pub language: Language,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct HouseholdRow {
    id: Uuid,
    name: String,
    language: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<HouseholdRow> for Household {
    fn from(row: HouseholdRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            language: Language::from_code(&row.language),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Household {
    /// Find a household by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, HouseholdRow>(
            "SELECT id, name, language, created_at, updated_at FROM household WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Household::from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code("hu"), Language::Hu);
        assert_eq!(Language::from_code("en"), Language::En);
        assert_eq!(Language::from_code("de"), Language::En);
        assert_eq!(Language::Hu.code(), "hu");
    }

    #[test]
    fn search_config_per_language() {
        assert_eq!(Language::En.search_config(), "english");
        assert_eq!(Language::Hu.search_config(), "hungarian");
    }
}
