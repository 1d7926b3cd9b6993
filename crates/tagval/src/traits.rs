//! Self-validation capability

use crate::error::BoxError;

/// Implemented by types that can check their own whole-object invariants.
///
/// The validator calls `validate` for every reachable value that exposes this
/// capability through [`Reflect::as_validatable`](crate::Reflect::as_validatable),
/// before walking its fields. Derived structs expose it with
/// `#[reflect(validatable)]`.
pub trait Validatable {
    fn validate(&self) -> Result<(), BoxError>;
}
