//! Domain model for editions, taggings and audit remarks.
//!
//! # Responsibility
//! - Define the records the reconciliation services read and mutate.
//! - Keep state-machine knowledge (frozen/published) next to the data.
//!
//! # Invariants
//! - Identifiers are the integer primary keys assigned by storage.
//! - A soft-deleted edition is never handed out as a live `Edition`.

pub mod edition;
pub mod instruction;
pub mod remark;
pub mod tagging;
