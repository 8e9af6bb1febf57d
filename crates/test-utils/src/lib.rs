//! Pantry test utilities.
//!
//! Helpers for integration testing: household and facet fixtures, a recipe
//! builder, and a seeded in-memory kitchen.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pantry_kernel::models::{Facet, FacetCatalog, Household, Language, RecipeRecord};
use pantry_kernel::store::MemoryStore;
use uuid::Uuid;

/// Create a test household with an English search configuration.
pub fn test_household(name: &str) -> Household {
    let now = Utc::now();
    Household {
        id: Uuid::now_v7(),
        name: name.to_string(),
        language: Language::En,
        created_at: now,
        updated_at: now,
    }
}

/// Create a facet with a fresh id.
pub fn facet(name: &str) -> Facet {
    Facet::named(Uuid::now_v7(), name)
}

/// Create a recipe builder.
pub fn test_recipe(household_id: Uuid, name: &str) -> TestRecipe {
    TestRecipe {
        record: RecipeRecord::new(household_id, name, Utc::now() - Duration::hours(1)),
    }
}

/// A recipe builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestRecipe {
    record: RecipeRecord,
}

impl TestRecipe {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.record.id = id;
        self
    }

    /// Set the creation time.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.record.created_at = at;
        self
    }

    /// Set the creation time relative to now.
    pub fn minutes_ago(self, minutes: i64) -> Self {
        self.created_at(Utc::now() - Duration::minutes(minutes))
    }

    pub fn with_meals(mut self, meals: &[&Facet]) -> Self {
        self.record.meal_ids.extend(meals.iter().map(|f| f.id));
        self
    }

    pub fn with_tags(mut self, tags: &[&Facet]) -> Self {
        self.record.tag_ids.extend(tags.iter().map(|f| f.id));
        self
    }

    pub fn with_cuisine(mut self, cuisine: &Facet) -> Self {
        self.record.cuisine_id = Some(cuisine.id);
        self
    }

    pub fn with_ingredients(mut self, ingredients: &[&Facet]) -> Self {
        self.record.ingredient_ids.extend(ingredients.iter().map(|f| f.id));
        self
    }

    pub fn build(self) -> RecipeRecord {
        self.record
    }
}

/// A household with facets and twelve recipes:
///
/// - five tagged `quick`, three of which are `breakfast`
/// - `vegan` on three recipes, one of them a breakfast
/// - cuisines: three Italian, two Mexican, the rest none
/// - `egg` in three recipes, `flour` in three
pub struct Kitchen {
    pub store: Arc<MemoryStore>,
    pub household: Household,
    pub quick: Facet,
    pub vegan: Facet,
    pub breakfast: Facet,
    pub dinner: Facet,
    pub italian: Facet,
    pub mexican: Facet,
    pub egg: Facet,
    pub flour: Facet,
    /// Recipe ids by name.
    pub recipes: Vec<(String, Uuid)>,
}

impl Kitchen {
    /// Id of a seeded recipe.
    pub fn recipe_id(&self, name: &str) -> Uuid {
        self.recipes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
            .unwrap_or_else(|| panic!("no recipe named {name}"))
    }
}

/// Seed the twelve-recipe kitchen into a fresh in-memory store.
pub fn kitchen() -> Kitchen {
    let store = Arc::new(MemoryStore::new());
    let household = test_household("Kovács family");

    let quick = facet("quick");
    let vegan = facet("vegan");
    let breakfast = facet("breakfast");
    let dinner = facet("dinner");
    let italian = facet("Italian");
    let mexican = facet("Mexican");
    let egg = facet("egg");
    let flour = facet("flour");

    store.insert_household(household.clone());
    store.set_catalog(
        household.id,
        FacetCatalog {
            meals: vec![breakfast.clone(), dinner.clone()],
            tags: vec![quick.clone(), vegan.clone()],
            cuisines: vec![italian.clone(), mexican.clone()],
            ingredients: vec![egg.clone(), flour.clone()],
        },
    );

    let h = household.id;
    let seeded = vec![
        test_recipe(h, "Scrambled Eggs")
            .with_tags(&[&quick])
            .with_meals(&[&breakfast])
            .with_ingredients(&[&egg]),
        test_recipe(h, "Pancakes")
            .with_tags(&[&quick])
            .with_meals(&[&breakfast])
            .with_ingredients(&[&egg, &flour]),
        test_recipe(h, "Overnight Oats")
            .with_tags(&[&quick, &vegan])
            .with_meals(&[&breakfast]),
        test_recipe(h, "Quick Pasta")
            .with_tags(&[&quick])
            .with_meals(&[&dinner])
            .with_cuisine(&italian),
        test_recipe(h, "Tacos")
            .with_tags(&[&quick])
            .with_meals(&[&dinner])
            .with_cuisine(&mexican),
        test_recipe(h, "Egg Muffins")
            .with_meals(&[&breakfast])
            .with_ingredients(&[&egg]),
        test_recipe(h, "Banana Bread")
            .with_meals(&[&breakfast])
            .with_ingredients(&[&flour]),
        test_recipe(h, "Lasagna")
            .with_meals(&[&dinner])
            .with_cuisine(&italian)
            .with_ingredients(&[&flour]),
        test_recipe(h, "Pizza Margherita")
            .with_meals(&[&dinner])
            .with_cuisine(&italian),
        test_recipe(h, "Burrito Bowl")
            .with_tags(&[&vegan])
            .with_meals(&[&dinner])
            .with_cuisine(&mexican),
        test_recipe(h, "Lentil Soup")
            .with_tags(&[&vegan])
            .with_meals(&[&dinner]),
        test_recipe(h, "Roast Chicken").with_meals(&[&dinner]),
    ];

    // Newest first in the order listed
    let mut recipes = Vec::with_capacity(seeded.len());
    for (i, recipe) in seeded.into_iter().enumerate() {
        let record = recipe.minutes_ago(i as i64 + 1).build();
        recipes.push((record.name.clone(), record.id));
        store.insert_recipe(record);
    }

    Kitchen {
        store,
        household,
        quick,
        vegan,
        breakfast,
        dinner,
        italian,
        mexican,
        egg,
        flour,
        recipes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_builder_sets_facets() {
        let household = test_household("Home");
        let quick = facet("quick");
        let italian = facet("Italian");

        let recipe = test_recipe(household.id, "Carbonara")
            .with_tags(&[&quick])
            .with_cuisine(&italian)
            .minutes_ago(5)
            .build();

        assert!(recipe.tag_ids.contains(&quick.id));
        assert_eq!(recipe.cuisine_id, Some(italian.id));
        assert!(recipe.created_at < Utc::now());
    }

    #[test]
    fn kitchen_seeds_twelve_recipes() {
        let kitchen = kitchen();
        assert_eq!(kitchen.store.recipe_count(), 12);
        assert_eq!(kitchen.recipes.len(), 12);
        assert_ne!(kitchen.recipe_id("Tacos"), kitchen.recipe_id("Lasagna"));
    }
}
