//! # tagval-derive
//!
//! Derive macro for the `tagval` reflection layer.
//!
//! `#[derive(Reflect)]` exposes a struct's fields, their visibility and
//! their `#[tag(...)]` attributes to the validator:
//! - `#[tag(key = "value", ...)]` on a field: rule strings, one per tag key
//! - `#[reflect(skip)]` on a field: leave the field out entirely
//! - `#[reflect(validatable)]` on the struct: route the struct's own
//!   `Validatable` impl to the validator

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod reflect;

/// Derive `tagval::Reflect` and `tagval::Struct` for a struct
///
/// Example:
/// ```rust,ignore
/// #[derive(Reflect)]
/// pub struct Signup {
///     #[tag(valid = "notempty,max=32")]
///     pub login: String,
///     #[reflect(skip)]
///     pub session: Session,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(tag, reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match reflect::expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
