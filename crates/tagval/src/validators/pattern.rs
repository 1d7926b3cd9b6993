//! `regex` rule

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::cache::SnapshotCache;
use crate::error::ValidationError;
use crate::reflect::{Kind, Reflect};

static PATTERNS: Lazy<SnapshotCache<String, Regex>> = Lazy::new(SnapshotCache::new);

/// `regex=PATTERN`: the value's text must contain a match for `PATTERN`.
///
/// Strings match as-is, other scalars on their display form. Containers
/// are rejected outright rather than matched element by element.
pub fn regex(value: &dyn Reflect, name: &str, param: &str) -> Result<(), ValidationError> {
    let Some(kind) = value.kind().resolve() else {
        return Ok(());
    };

    let text = match kind {
        Kind::Sequence(_) | Kind::Mapping(_) => {
            return Err(ValidationError::field(
                name,
                format!("{} must not be of type slice, array or map.", name),
            ))
        }
        Kind::Primitive(p) => p.to_string(),
        _ => return Err(ValidationError::unsupported(name)),
    };

    let Ok(pattern) = compiled(param) else {
        return Err(ValidationError::field(
            name,
            format!("{} regex is not valid.", name),
        ));
    };

    if !pattern.is_match(&text) {
        return Err(ValidationError::field(
            name,
            format!("{} is not a valid value.", name),
        ));
    }
    Ok(())
}

fn compiled(param: &str) -> Result<Regex, regex::Error> {
    PATTERNS.get_or_try_insert_with(param, |source| {
        let pattern = Regex::new(source)?;
        debug!(pattern = source, "compiled rule pattern");
        Ok(pattern)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{with_rule, Validator};
    use crate::Reflect;

    fn validator() -> Validator {
        Validator::new([with_rule("regex", regex)])
    }

    #[derive(Reflect)]
    struct Account {
        #[tag(valid = "regex=^[a-z]+$")]
        pub login: String,
        #[tag(valid = "regex=^[0-9]{3}$")]
        pub code: u16,
        #[tag(valid = "regex=^[a-z]+$")]
        pub alias: Option<String>,
    }

    #[test]
    fn test_matching_values_pass() {
        let account = Account {
            login: "abc".into(),
            code: 123,
            alias: None,
        };
        assert!(validator().validate(&account).is_ok());
    }

    #[test]
    fn test_mismatch() {
        let account = Account {
            login: "Abc".into(),
            code: 12,
            alias: Some("x1".into()),
        };

        let errors = validator().validate(&account).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "login is not a valid value.",
                "code is not a valid value.",
                "alias is not a valid value.",
            ]
        );
    }

    #[derive(Reflect)]
    struct Shapes {
        #[tag(valid = "regex=a")]
        pub list: Vec<String>,
        #[tag(valid = "regex=(")]
        pub broken: String,
    }

    #[test]
    fn test_containers_and_bad_patterns() {
        let shapes = Shapes {
            list: vec!["a".into()],
            broken: "a".into(),
        };

        let errors = validator().validate(&shapes).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "list must not be of type slice, array or map.",
                "broken regex is not valid.",
            ]
        );
    }

    #[test]
    fn test_patterns_are_cached() {
        let first = compiled("^cached-[0-9]+$").unwrap();
        let second = compiled("^cached-[0-9]+$").unwrap();
        assert_eq!(first.as_str(), second.as_str());
        assert!(PATTERNS.get("^cached-[0-9]+$").is_some());
        assert!(compiled("[").is_err());
        assert!(PATTERNS.get("[").is_none());
    }
}
