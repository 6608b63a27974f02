//! Domain layer types and invariants.

pub mod entities;
pub mod scopes;
pub mod validation;
