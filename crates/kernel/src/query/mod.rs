//! Recipe query execution.
//!
//! This module provides:
//! - RecipeQueryBuilder: SeaQuery-based SQL generation for pages and counts
//! - RecipeQueryService: stateless page execution for HTTP clients
//! - Types: RecipePage, PageRequest, result ordering

mod builder;
mod service;
pub mod types;

pub use builder::RecipeQueryBuilder;
pub use service::RecipeQueryService;
pub use types::{PageRequest, RecipePage, sort_summaries};
