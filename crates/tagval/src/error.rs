//! Validation error types and aggregation

use std::fmt;
use std::ops::Index;
use thiserror::Error;

/// Boxed error returned by self-validating values and custom rules
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// A single violation recorded during one validation run
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A rule matched a field and the value failed its predicate
    #[error("{message}")]
    Field { field: String, message: String },

    /// Unknown rule name, or a rule applied to a value it cannot interpret
    #[error("validator: unsupported: {field}{}", rule_suffix(.rule))]
    Unsupported { field: String, rule: Option<String> },

    /// Error returned verbatim by a self-validating value or a custom rule
    #[error(transparent)]
    Custom(BoxError),

    /// A rule parameter that could not be parsed
    #[error("validator: invalid parameter {param:?} for rule {rule} on {field}: {reason}")]
    InvalidParameter {
        field: String,
        rule: String,
        param: String,
        reason: String,
    },

    /// Panic captured at the boundary of a validation call
    #[error("validator: {0}")]
    Internal(String),

    /// Traversal exceeded the configured depth limit
    #[error("validator: recursion limit of {limit} exceeded")]
    RecursionLimit { limit: usize },
}

fn rule_suffix(rule: &Option<String>) -> String {
    match rule {
        Some(rule) => format!(" (rule \"{}\")", rule),
        None => String::new(),
    }
}

impl ValidationError {
    /// Create a field violation; the message should name the field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Signal that a rule does not know how to interpret the field's value
    pub fn unsupported(field: impl Into<String>) -> Self {
        Self::Unsupported {
            field: field.into(),
            rule: None,
        }
    }

    /// Signal that a tag names a rule with no registered implementation
    pub fn unknown_rule(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Unsupported {
            field: field.into(),
            rule: Some(rule.into()),
        }
    }

    /// Wrap an arbitrary error
    pub fn custom<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Custom(error.into())
    }

    pub fn invalid_parameter(
        field: impl Into<String>,
        rule: impl Into<String>,
        param: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            rule: rule.into(),
            param: param.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            Self::Field { .. } => "field_violation",
            Self::Unsupported { .. } => "unsupported",
            Self::Custom(_) => "custom",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::Internal(_) => "internal",
            Self::RecursionLimit { .. } => "recursion_limit",
        }
    }

    /// The field this error is attributed to, when known
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Field { field, .. }
            | Self::Unsupported { field, .. }
            | Self::InvalidParameter { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Whether this is an unsupported-rule error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "field": self.field_name(),
            "message": self.to_string(),
        })
    }
}

/// Ordered collection of every violation found in one validation call
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Append an error, keeping encounter order
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Errors attributed to a specific field, in encounter order
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field_name() == Some(field))
    }

    /// Messages of every error, in encounter order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> ValidationResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Convert to a JSON-serializable format for API responses
    pub fn to_json(&self) -> serde_json::Value {
        let errors: Vec<serde_json::Value> = self.errors.iter().map(ValidationError::to_json).collect();
        serde_json::json!({
            "error": {
                "code": "validation_failed",
                "message": self.to_string(),
                "errors": errors
            }
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl Index<usize> for ValidationErrors {
    type Output = ValidationError;

    fn index(&self, index: usize) -> &Self::Output {
        &self.errors[index]
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
