//! Recipe query conditions.
//!
//! This module provides:
//! - Condition: backend-agnostic boolean expression tree
//! - compile: FilterConditions -> household-scoped, snapshot-bounded Condition
//! - Condition::matches: in-process evaluation against a RecipeRecord
//! - sql: SeaQuery serializer for the PostgreSQL schema

mod ast;
mod compiler;
mod evaluate;
pub mod sql;

pub use ast::{CompiledQuery, Condition, IdField, RecipeOrder, SetField};
pub use compiler::{QueryScope, compile};
pub use evaluate::relevance;
