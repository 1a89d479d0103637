//! Insurance claim investigation
//!
//! Scores the entity network around a claim with a GraphSAGE-style model,
//! matches the claim description against policy clauses and synthesizes a
//! verdict, optionally with an external reasoning service.

pub mod app;
pub mod model;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;
