//! Reconciliation services.
//!
//! # Responsibility
//! - Resolve, mutate and re-register taggings for one substitution at a time.
//! - Keep storage and downstream systems behind repository/contract traits.
//!
//! # Invariants
//! - Every operation receives the instruction it works on as an argument.
//! - Per-tagging and per-edition failures never abort the enclosing batch.

pub mod mutator;
pub mod orchestrator;
pub mod registrar;
pub mod resolver;
