//! Scoring for the ranking service.
//!
//! This module holds the only domain arithmetic in the service. Everything
//! else (lookup, fetching, ranking, reporting) is plumbing around it.
//!
//! Submodules:
//! - `raininess` — weighted historical rain + forecast boost, log-normalized.

pub mod raininess;
