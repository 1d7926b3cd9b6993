//! Structural view of values.
//!
//! The validator never inspects concrete types. Every value it walks exposes
//! its shape through [`Reflect::kind`], a closed set of variants the traversal
//! switches on. Structs get their implementation from `#[derive(Reflect)]`;
//! std containers, pointers and primitives are covered in [`impls`].

use std::any::TypeId;
use std::fmt;

use crate::tag;
use crate::traits::Validatable;

mod impls;

/// A value the validator can walk.
pub trait Reflect {
    /// Structural kind of this value
    fn kind(&self) -> Kind<'_>;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Self-validation capability, if the value has one.
    ///
    /// Pointer wrappers forward to their pointee so the capability is seen
    /// once per position, before indirection is resolved.
    fn as_validatable(&self) -> Option<&dyn Validatable> {
        None
    }

    /// Whether values of this type can contain anything worth walking.
    ///
    /// Struct fields without rules and sequence/mapping elements are only
    /// visited when their type is recursible. An impl that overrides
    /// [`as_validatable`](Reflect::as_validatable) must also return `true`
    /// here, or its self-validation never runs for untagged fields and
    /// container elements.
    fn recursible() -> bool
    where
        Self: Sized,
    {
        false
    }
}

/// The closed set of shapes the traversal understands
#[derive(Clone, Copy)]
pub enum Kind<'a> {
    Struct(&'a dyn Struct),
    Sequence(&'a dyn Sequence),
    Mapping(&'a dyn Mapping),
    /// Optional or owning indirection; `None` is an absent reference
    Pointer(Option<&'a dyn Reflect>),
    /// Type-erased value; `None` is an empty dynamic value
    Dynamic(Option<&'a dyn Reflect>),
    Primitive(Primitive<'a>),
    /// Terminal value with no structure or scalar meaning
    Opaque,
}

impl<'a> Kind<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Struct(_) => "struct",
            Kind::Sequence(_) => "sequence",
            Kind::Mapping(_) => "mapping",
            Kind::Pointer(_) => "pointer",
            Kind::Dynamic(_) => "dynamic",
            Kind::Primitive(_) => "primitive",
            Kind::Opaque => "opaque",
        }
    }

    /// Follow pointers until a non-pointer kind or an absent reference.
    ///
    /// Returns `None` when the chain ends in an absent reference.
    pub fn resolve(self) -> Option<Kind<'a>> {
        let mut kind = self;
        loop {
            match kind {
                Kind::Pointer(Some(inner)) => kind = inner.kind(),
                Kind::Pointer(None) => return None,
                other => return Some(other),
            }
        }
    }

    /// Length of strings, sequences and mappings
    pub fn len(&self) -> Option<usize> {
        match self {
            Kind::Sequence(seq) => Some(seq.len()),
            Kind::Mapping(map) => Some(map.len()),
            Kind::Primitive(Primitive::Str(s)) => Some(s.len()),
            _ => None,
        }
    }
}

impl fmt::Debug for Kind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Struct(s) => f.debug_tuple("Struct").field(&s.type_name()).finish(),
            Kind::Sequence(s) => f.debug_struct("Sequence").field("len", &s.len()).finish(),
            Kind::Mapping(m) => f.debug_struct("Mapping").field("len", &m.len()).finish(),
            Kind::Pointer(p) => f
                .debug_tuple("Pointer")
                .field(&p.map(|v| v.type_name()))
                .finish(),
            Kind::Dynamic(d) => f
                .debug_tuple("Dynamic")
                .field(&d.map(|v| v.type_name()))
                .finish(),
            Kind::Primitive(p) => f.debug_tuple("Primitive").field(p).finish(),
            Kind::Opaque => f.write_str("Opaque"),
        }
    }
}

/// Scalar values, widened to their largest representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive<'a> {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(&'a str),
}

impl fmt::Display for Primitive<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Bool(v) => write!(f, "{}", v),
            Primitive::Int(v) => write!(f, "{}", v),
            Primitive::Uint(v) => write!(f, "{}", v),
            Primitive::Float(v) => write!(f, "{}", v),
            Primitive::Str(v) => f.write_str(v),
        }
    }
}

/// A struct with a fixed, ordered field layout
pub trait Struct {
    /// Identity of the shape, used as the metadata cache key
    fn shape_id(&self) -> TypeId;

    fn type_name(&self) -> &'static str;

    /// Every reflected field in declaration order.
    ///
    /// Only consulted the first time a shape is seen by a validator.
    fn fields(&self) -> Vec<FieldInfo>;

    /// Field value by declaration index
    fn field(&self, index: usize) -> Option<&dyn Reflect>;
}

/// Static description of one struct field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub index: usize,
    pub name: &'static str,
    /// Declared with `pub` or a restricted `pub(..)` visibility
    pub exported: bool,
    /// Tuple-struct field, always considered regardless of visibility
    pub positional: bool,
    /// Raw `key = "value"` pairs from `#[tag(...)]`, in declaration order
    pub tags: &'static [(&'static str, &'static str)],
    pub recursible: bool,
}

impl FieldInfo {
    /// Value of the first tag with the given key
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        tag::lookup(self.tags, key)
    }
}

/// Ordered collection of values
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in index order
    fn elements(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_>;

    fn element_recursible(&self) -> bool;
}

/// Keyed collection; only values are walked
pub trait Mapping {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values in the container's iteration order
    fn values(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_>;

    fn value_recursible(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_follows_pointers() {
        let value: Option<Box<i32>> = Some(Box::new(7));
        match value.kind().resolve() {
            Some(Kind::Primitive(Primitive::Int(7))) => {}
            other => panic!("unexpected kind: {:?}", other),
        }

        let absent: Option<Box<i32>> = None;
        assert!(absent.kind().resolve().is_none());
    }

    #[test]
    fn test_len_of_length_kinds() {
        assert_eq!("abc".kind().len(), Some(3));
        assert_eq!(vec![1u8, 2].kind().len(), Some(2));
        assert_eq!(5i32.kind().len(), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(true.kind().name(), "primitive");
        assert_eq!(().kind().name(), "opaque");
        assert_eq!(Some(1u8).kind().name(), "pointer");
    }

    #[test]
    fn test_primitive_display() {
        assert_eq!(Primitive::Float(3.2099999).to_string(), "3.2099999");
        assert_eq!(Primitive::Float(-1.0).to_string(), "-1");
        assert_eq!(Primitive::Int(-15).to_string(), "-15");
        assert_eq!(Primitive::Str("x").to_string(), "x");
    }
}
