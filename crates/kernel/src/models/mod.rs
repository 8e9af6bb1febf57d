//! Database models.

pub mod facet;
pub mod household;
pub mod meal_rule;
pub mod recipe;

pub use facet::{Facet, FacetCatalog, FacetKind};
pub use household::{Household, Language};
pub use meal_rule::MealRule;
pub use recipe::{RecipeRecord, RecipeSummary};
