//! Validator façade and traversal engine

use std::any::{Any, TypeId};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, trace, warn};

use crate::cache::SnapshotCache;
use crate::config::{ConfigError, ValidatorConfig, DEFAULT_TAG_NAME};
use crate::error::{ValidationError, ValidationErrors, ValidationResult};
use crate::reflect::{Kind, Mapping, Reflect, Sequence, Struct};
use crate::registry::RuleRegistry;
use crate::tag;
use crate::validators;

/// Configuration mutator applied in order by [`Validator::new`]
pub type Configure = Box<dyn FnOnce(&mut Validator)>;

/// Cached metadata about one validated struct field
#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    index: usize,
    name: &'static str,
    rules: &'static str,
}

/// Walks values and applies the rules named in their field tags.
///
/// A validator is built once and then shared; `validate` takes `&self` and
/// may run concurrently from any number of threads.
pub struct Validator {
    tag_name: String,
    rules: RuleRegistry,
    max_depth: Option<usize>,
    fields: SnapshotCache<TypeId, Arc<[Field]>>,
}

impl Validator {
    /// Create a validator with no rules, then apply `options` in order
    pub fn new<I>(options: I) -> Self
    where
        I: IntoIterator<Item = Configure>,
    {
        let mut validator = Self {
            tag_name: DEFAULT_TAG_NAME.to_string(),
            rules: RuleRegistry::new(),
            max_depth: None,
            fields: SnapshotCache::new(),
        };
        for option in options {
            option(&mut validator);
        }
        validator
    }

    /// Validator with the built-in rules under the default tag name
    pub fn with_defaults() -> Self {
        Self::new([validators::default_rules()])
    }

    /// Validator built from a loaded configuration, checked first
    pub fn from_config(config: ValidatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new([with_config(config)]))
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub(crate) fn set_tag_name(&mut self, tag_name: impl Into<String>) {
        self.tag_name = tag_name.into();
    }

    pub(crate) fn register<F>(&mut self, name: &str, rule: F)
    where
        F: Fn(&dyn Reflect, &str, &str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.rules.register(name, Arc::new(rule));
    }

    /// Validate `value` and everything reachable from it.
    ///
    /// Returns every violation found, in encounter order. A panic raised
    /// while walking is captured and reported as one more entry.
    pub fn validate(&self, value: &dyn Reflect) -> ValidationResult<()> {
        let mut state = State::new(self);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| state.validate_value(value)));
        if let Err(payload) = outcome {
            let error = panic_error(payload);
            warn!(error = %error, "recovered from panic during validation");
            state.errors.add(error);
        }
        trace!(
            type_name = value.type_name(),
            violations = state.errors.len(),
            "validation finished"
        );
        state.errors.into_result()
    }

    /// Number of struct shapes whose metadata has been cached
    pub fn cached_shapes(&self) -> usize {
        self.fields.len()
    }

    fn fields_of(&self, shape: &dyn Struct) -> Arc<[Field]> {
        self.fields.get_or_insert_with(&shape.shape_id(), |_| {
            let fields: Arc<[Field]> = shape
                .fields()
                .into_iter()
                .filter_map(|info| {
                    // Private named fields are skipped; tuple fields are not
                    if !info.exported && !info.positional {
                        return None;
                    }
                    let rules = info.tag(&self.tag_name).unwrap_or("");
                    if rules == "-" {
                        return None;
                    }
                    if rules.is_empty() && !info.recursible {
                        return None;
                    }
                    Some(Field {
                        index: info.index,
                        name: info.name,
                        rules,
                    })
                })
                .collect();
            debug!(
                shape = shape.type_name(),
                fields = fields.len(),
                "cached struct field metadata"
            );
            fields
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("tag_name", &self.tag_name)
            .field("rules", &self.rules)
            .field("max_depth", &self.max_depth)
            .field("cached_shapes", &self.fields.len())
            .finish()
    }
}

/// Read rule strings from `#[tag(<tag_name> = "...")]`
pub fn with_tag_name(tag_name: impl Into<String>) -> Configure {
    let tag_name = tag_name.into();
    Box::new(move |v: &mut Validator| v.set_tag_name(tag_name))
}

/// Register `rule` under `name`, overriding any earlier rule of that name.
///
/// # Panics
///
/// Panics if `name` is empty.
pub fn with_rule<F>(name: impl Into<String>, rule: F) -> Configure
where
    F: Fn(&dyn Reflect, &str, &str) -> Result<(), ValidationError> + Send + Sync + 'static,
{
    let name = name.into();
    if name.is_empty() {
        panic!("validator: invalid rule name {:?}", name);
    }
    Box::new(move |v: &mut Validator| v.register(&name, rule))
}

/// Stop descending after `limit` nested values and report a recursion error
pub fn with_max_depth(limit: usize) -> Configure {
    Box::new(move |v: &mut Validator| v.max_depth = Some(limit))
}

/// Apply a loaded [`ValidatorConfig`]; registers the built-in rules first
/// when `default_rules` is set.
///
/// # Panics
///
/// Panics if the configuration does not pass [`ValidatorConfig::validate`].
/// Use [`Validator::from_config`] to get the error instead.
pub fn with_config(config: ValidatorConfig) -> Configure {
    if let Err(e) = config.validate() {
        panic!("validator: invalid config: {}", e);
    }
    Box::new(move |v: &mut Validator| {
        if config.default_rules {
            (validators::default_rules())(v);
        }
        v.set_tag_name(config.tag_name);
        v.max_depth = config.max_depth;
    })
}

static GLOBAL: Lazy<Validator> = Lazy::new(Validator::with_defaults);

/// Process-wide validator with the built-in rules, built on first use
pub fn global() -> &'static Validator {
    &GLOBAL
}

/// Validate `value` with the [`global`] validator
pub fn validate(value: &dyn Reflect) -> ValidationResult<()> {
    global().validate(value)
}

fn panic_error(payload: Box<dyn Any + Send>) -> ValidationError {
    let payload = match payload.downcast::<ValidationError>() {
        Ok(error) => return *error,
        Err(payload) => payload,
    };
    if let Some(message) = payload.downcast_ref::<&str>() {
        ValidationError::Internal(message.to_string())
    } else if let Some(message) = payload.downcast_ref::<String>() {
        ValidationError::Internal(message.clone())
    } else {
        ValidationError::Internal("panic during validation".to_string())
    }
}

/// Errors and depth of one validation run
struct State<'v> {
    validator: &'v Validator,
    errors: ValidationErrors,
    depth: usize,
}

impl<'v> State<'v> {
    fn new(validator: &'v Validator) -> Self {
        Self {
            validator,
            errors: ValidationErrors::new(),
            depth: 0,
        }
    }

    fn validate_value(&mut self, value: &dyn Reflect) {
        if let Some(limit) = self.validator.max_depth {
            if self.depth >= limit {
                self.errors.add(ValidationError::RecursionLimit { limit });
                return;
            }
        }
        self.depth += 1;

        self.validate_validatable(value);

        match value.kind().resolve() {
            Some(Kind::Struct(shape)) => self.validate_struct(shape),
            Some(Kind::Sequence(seq)) => self.validate_sequence(seq),
            Some(Kind::Mapping(map)) => self.validate_mapping(map),
            Some(Kind::Dynamic(Some(inner))) => self.validate_value(inner),
            _ => {}
        }

        self.depth -= 1;
    }

    fn validate_validatable(&mut self, value: &dyn Reflect) {
        if let Some(validatable) = value.as_validatable() {
            if let Err(err) = validatable.validate() {
                self.errors.add(ValidationError::Custom(err));
            }
        }
    }

    fn validate_struct(&mut self, shape: &dyn Struct) {
        let fields = self.validator.fields_of(shape);
        for field in fields.iter() {
            let value = match shape.field(field.index) {
                Some(value) => value,
                None => continue,
            };
            if !field.rules.is_empty() {
                self.validate_field(value, field.name, field.rules);
            }
            self.validate_value(value);
        }
    }

    fn validate_sequence(&mut self, seq: &dyn Sequence) {
        if !seq.element_recursible() {
            return;
        }
        for element in seq.elements() {
            self.validate_value(element);
        }
    }

    fn validate_mapping(&mut self, map: &dyn Mapping) {
        if !map.value_recursible() || map.is_empty() {
            return;
        }
        for value in map.values() {
            self.validate_value(value);
        }
    }

    fn validate_field(&mut self, value: &dyn Reflect, name: &str, rules: &str) {
        for spec in tag::parse_rules(rules) {
            match self.validator.rules.get(spec.name) {
                Some(rule) => {
                    if let Err(err) = rule(value, name, spec.param) {
                        self.errors.add(err);
                    }
                }
                None => self.errors.add(ValidationError::unknown_rule(name, spec.name)),
            }
        }
    }
}
