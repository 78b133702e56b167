//! Git Browse - history-aware browsing of a local git repository.
//!
//! The engine lives in [`git`]; [`routes`] exposes it as a JSON API.

pub mod cache;
pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod routes;
