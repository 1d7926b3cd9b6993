//! # tagval
//!
//! Tag-driven validation of live values. Fields carry rule strings in
//! `#[tag(valid = "...")]` attributes; a [`Validator`] walks a value,
//! resolves pointers and containers, and applies the named rules to every
//! tagged field it reaches. All violations are collected, never just the
//! first.
//!
//! ```
//! use tagval::Reflect;
//!
//! #[derive(Reflect)]
//! struct Signup {
//!     #[tag(valid = "notempty")]
//!     pub login: String,
//!     #[tag(valid = "min=18")]
//!     pub age: u8,
//! }
//!
//! let errors = tagval::validate(&Signup { login: String::new(), age: 17 }).unwrap_err();
//! assert_eq!(
//!     errors.to_string(),
//!     "login must not be empty; age must not be less than 18 (was 17)"
//! );
//! ```

// Lets the derive macro's `::tagval::` paths resolve inside this crate too
extern crate self as tagval;

pub mod cache;
pub mod config;
pub mod error;
pub mod reflect;
pub mod registry;
pub mod tag;
pub mod traits;
pub mod validator;
pub mod validators;

pub use cache::SnapshotCache;
pub use config::{ConfigError, ValidatorConfig, DEFAULT_TAG_NAME};
pub use error::{BoxError, ValidationError, ValidationErrors, ValidationResult};
pub use reflect::{FieldInfo, Kind, Mapping, Primitive, Reflect, Sequence, Struct};
pub use registry::{RuleFn, RuleRegistry};
pub use traits::Validatable;
pub use validator::{
    global, validate, with_config, with_max_depth, with_rule, with_tag_name, Configure, Validator,
};
pub use validators::default_rules;

pub use tagval_derive::Reflect;
