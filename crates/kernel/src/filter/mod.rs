//! Recipe filter selections.
//!
//! This module provides:
//! - FilterConditions: search text plus include/exclude facet selections
//! - FilterGroup / CuisineGroup: per-facet include groups
//! - BoolOperator: AND/OR combinator used at both nesting levels

mod conditions;

pub use conditions::{
    BoolOperator, CuisineGroup, ExcludeSet, FilterConditions, FilterGroup, IncludeSet,
};
