//! Facet models: meals, tags, cuisines and ingredients.
//!
//! Facets are the categorical dimensions recipes are filtered by. Each
//! household defines its own facet values.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The four facet dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Meal,
    Tag,
    Cuisine,
    Ingredient,
}

impl FacetKind {
    /// All kinds in catalog order.
    pub const ALL: [FacetKind; 4] = [
        FacetKind::Meal,
        FacetKind::Tag,
        FacetKind::Cuisine,
        FacetKind::Ingredient,
    ];

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            FacetKind::Meal => "meal",
            FacetKind::Tag => "recipe_tag",
            FacetKind::Cuisine => "cuisine",
            FacetKind::Ingredient => "ingredient",
        }
    }

    /// Columns selected for this kind. Missing display attributes are
    /// selected as NULL so every kind maps onto [`Facet`].
    fn select_list(self) -> &'static str {
        match self {
            FacetKind::Meal => "id, name, color, NULL::text AS icon, NULL::text AS flag",
            FacetKind::Tag => "id, name, color, icon, NULL::text AS flag",
            FacetKind::Cuisine => "id, name, color, NULL::text AS icon, flag",
            FacetKind::Ingredient => {
                "id, name, NULL::text AS color, NULL::text AS icon, NULL::text AS flag"
            }
        }
    }
}

/// A single facet value with its display attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Facet {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

impl Facet {
    /// Facet with a name and no display attributes.
    pub fn named(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
            icon: None,
            flag: None,
        }
    }

    /// List all facets of a kind for a household, sorted by name.
    pub async fn list(
        pool: &PgPool,
        kind: FacetKind,
        household_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM {} WHERE household_id = $1 ORDER BY name ASC, id ASC",
            kind.select_list(),
            kind.table()
        );

        sqlx::query_as::<_, Facet>(&sql)
            .bind(household_id)
            .fetch_all(pool)
            .await
    }
}

/// Every facet a household can filter by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCatalog {
    pub meals: Vec<Facet>,
    pub tags: Vec<Facet>,
    pub cuisines: Vec<Facet>,
    pub ingredients: Vec<Facet>,
}

impl FacetCatalog {
    /// Facets of one kind.
    pub fn of_kind(&self, kind: FacetKind) -> &[Facet] {
        match kind {
            FacetKind::Meal => &self.meals,
            FacetKind::Tag => &self.tags,
            FacetKind::Cuisine => &self.cuisines,
            FacetKind::Ingredient => &self.ingredients,
        }
    }

    /// Whether the household has defined no facets at all.
    pub fn is_empty(&self) -> bool {
        FacetKind::ALL.iter().all(|k| self.of_kind(*k).is_empty())
    }

    /// Look up a facet by id within one kind.
    pub fn find(&self, kind: FacetKind, id: Uuid) -> Option<&Facet> {
        self.of_kind(kind).iter().find(|f| f.id == id)
    }

    /// Sort every list by name ascending, ties by id.
    pub fn sort(&mut self) {
        for list in [
            &mut self.meals,
            &mut self.tags,
            &mut self.cuisines,
            &mut self.ingredients,
        ] {
            list.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        }
    }

    /// Load the full catalog for a household.
    pub async fn load(pool: &PgPool, household_id: Uuid) -> Result<Self, sqlx::Error> {
        let (meals, tags, cuisines, ingredients) = tokio::try_join!(
            Facet::list(pool, FacetKind::Meal, household_id),
            Facet::list(pool, FacetKind::Tag, household_id),
            Facet::list(pool, FacetKind::Cuisine, household_id),
            Facet::list(pool, FacetKind::Ingredient, household_id),
        )?;

        Ok(Self {
            meals,
            tags,
            cuisines,
            ingredients,
        })
    }
}
