//! Presence rules: `notempty` and `notnil`

use crate::error::ValidationError;
use crate::reflect::{Kind, Primitive, Reflect};

/// `notempty`: the value must not be empty, false, zero or absent.
///
/// Present pointers pass without looking at the pointee.
pub fn not_empty(value: &dyn Reflect, name: &str, _param: &str) -> Result<(), ValidationError> {
    let failure = match value.kind() {
        Kind::Sequence(seq) => seq.is_empty().then_some("empty"),
        Kind::Mapping(map) => map.is_empty().then_some("empty"),
        Kind::Primitive(Primitive::Str(s)) => s.is_empty().then_some("empty"),
        Kind::Primitive(Primitive::Bool(b)) => (!b).then_some("false"),
        Kind::Primitive(Primitive::Int(i)) => (i == 0).then_some("zero"),
        Kind::Primitive(Primitive::Uint(u)) => (u == 0).then_some("zero"),
        Kind::Primitive(Primitive::Float(f)) => (f == 0.0).then_some("zero"),
        Kind::Pointer(p) | Kind::Dynamic(p) => p.is_none().then_some("nil"),
        Kind::Struct(_) | Kind::Opaque => return Err(ValidationError::unsupported(name)),
    };

    match failure {
        Some(what) => Err(ValidationError::field(
            name,
            format!("{} must not be {}", name, what),
        )),
        None => Ok(()),
    }
}

/// `notnil`: pointer and dynamic values must be present
pub fn not_nil(value: &dyn Reflect, name: &str, _param: &str) -> Result<(), ValidationError> {
    match value.kind() {
        Kind::Pointer(None) | Kind::Dynamic(None) => Err(ValidationError::field(
            name,
            format!("{} must not be nil", name),
        )),
        Kind::Pointer(Some(_)) | Kind::Dynamic(Some(_)) => Ok(()),
        _ => Err(ValidationError::unsupported(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{with_rule, Validator};
    use crate::Reflect;
    use std::collections::HashMap;

    #[derive(Reflect)]
    struct Subject {
        pub x: i32,
    }

    #[derive(Reflect)]
    struct Fields {
        #[tag(valid = "notempty")]
        pub a: String,
        #[tag(valid = "notempty")]
        pub z: String,
        #[tag(valid = "notempty")]
        pub b: i32,
        #[tag(valid = "notempty")]
        pub y: i32,
        #[tag(valid = "notempty")]
        pub c: bool,
        #[tag(valid = "notempty")]
        pub x: bool,
        #[tag(valid = "notempty")]
        pub d: Option<Box<Subject>>,
        #[tag(valid = "notempty")]
        pub w: Option<Box<Subject>>,
        #[tag(valid = "notempty")]
        pub e: Vec<u8>,
        #[tag(valid = "notempty")]
        pub v: Vec<u8>,
        #[tag(valid = "notempty")]
        pub f: Option<Box<dyn Reflect + Send + Sync>>,
        #[tag(valid = "notempty")]
        pub u: Option<Box<dyn Reflect + Send + Sync>>,
        #[tag(valid = "notempty")]
        pub g: f64,
        #[tag(valid = "notempty")]
        pub h: HashMap<u8, u8>,
    }

    #[test]
    fn test_not_empty() {
        let s = Fields {
            a: String::new(),
            z: "a".into(),
            b: 0,
            y: 1,
            c: false,
            x: true,
            d: None,
            w: Some(Box::new(Subject { x: 0 })),
            e: Vec::new(),
            v: b"a".to_vec(),
            f: None,
            u: Some(Box::new(1u8)),
            g: 0.0,
            h: HashMap::new(),
        };
        let v = Validator::new([with_rule("notempty", not_empty)]);

        let errors = v.validate(&s).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "a must not be empty",
                "b must not be zero",
                "c must not be false",
                "d must not be nil",
                "e must not be empty",
                "f must not be nil",
                "g must not be zero",
                "h must not be empty",
            ]
        );
    }

    #[derive(Reflect)]
    struct Unsupported {
        #[tag(valid = "notempty")]
        pub a: Subject,
    }

    #[test]
    fn test_not_empty_unsupported() {
        let v = Validator::new([with_rule("notempty", not_empty)]);

        let errors = v.validate(&Unsupported { a: Subject { x: 0 } }).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "validator: unsupported: a");
    }

    #[derive(Reflect)]
    struct Pointers {
        #[tag(valid = "notnil")]
        pub a: Option<String>,
        #[tag(valid = "notnil")]
        pub b: Option<String>,
        #[tag(valid = "notnil")]
        pub c: String,
    }

    #[test]
    fn test_not_nil() {
        let v = Validator::new([with_rule("notnil", not_nil)]);
        let s = Pointers {
            a: None,
            b: Some(String::new()),
            c: String::new(),
        };

        let errors = v.validate(&s).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec!["a must not be nil", "validator: unsupported: c"]
        );
    }
}
