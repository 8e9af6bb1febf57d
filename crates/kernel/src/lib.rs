//! Pantry Kernel Library
//!
//! Recipe filtering, condition compilation and paginated recipe queries for
//! households. The `pantry` binary serves these over HTTP and drives them
//! from the command line.

pub mod catalog;
pub mod condition;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod filter;
pub mod models;
pub mod query;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use state::AppState;
