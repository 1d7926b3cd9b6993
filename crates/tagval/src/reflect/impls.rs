//! Reflect implementations for std and serde_json types

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use super::{Kind, Mapping, Primitive, Reflect, Sequence};
use crate::traits::Validatable;

macro_rules! impl_primitive {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {
        $(
            impl Reflect for $ty {
                fn kind(&self) -> Kind<'_> {
                    Kind::Primitive(Primitive::$variant(*self as $wide))
                }
            }
        )*
    };
}

impl_primitive!(Int as i64: i8, i16, i32, i64, isize);
impl_primitive!(Uint as u64: u8, u16, u32, u64, usize);
impl_primitive!(Float as f64: f32, f64);

impl Reflect for bool {
    fn kind(&self) -> Kind<'_> {
        Kind::Primitive(Primitive::Bool(*self))
    }
}

impl Reflect for String {
    fn kind(&self) -> Kind<'_> {
        Kind::Primitive(Primitive::Str(self))
    }
}

impl Reflect for &str {
    fn kind(&self) -> Kind<'_> {
        Kind::Primitive(Primitive::Str(self))
    }
}

impl Reflect for Cow<'_, str> {
    fn kind(&self) -> Kind<'_> {
        Kind::Primitive(Primitive::Str(self))
    }
}

impl Reflect for () {
    fn kind(&self) -> Kind<'_> {
        Kind::Opaque
    }
}

impl<T: ?Sized> Reflect for PhantomData<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Opaque
    }
}

// Indirection

impl<T: Reflect> Reflect for Option<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Pointer(self.as_ref().map(|v| v as &dyn Reflect))
    }

    fn as_validatable(&self) -> Option<&dyn Validatable> {
        self.as_ref().and_then(Reflect::as_validatable)
    }

    fn recursible() -> bool {
        true
    }
}

macro_rules! impl_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Reflect> Reflect for $ptr<T> {
                fn kind(&self) -> Kind<'_> {
                    Kind::Pointer(Some(&**self))
                }

                fn as_validatable(&self) -> Option<&dyn Validatable> {
                    (**self).as_validatable()
                }

                fn recursible() -> bool {
                    true
                }
            }
        )*
    };
}

impl_pointer!(Box, Rc, Arc);

impl<T: Reflect> Reflect for &T {
    fn kind(&self) -> Kind<'_> {
        Kind::Pointer(Some(*self))
    }

    fn as_validatable(&self) -> Option<&dyn Validatable> {
        (**self).as_validatable()
    }

    fn recursible() -> bool {
        true
    }
}

// Type-erased values. The concrete value is walked from the top, so the
// wrapper itself never reports a self-validation capability.

macro_rules! impl_dynamic {
    ($($ty:ty),*) => {
        $(
            impl Reflect for $ty {
                fn kind(&self) -> Kind<'_> {
                    Kind::Dynamic(Some(&**self))
                }

                fn recursible() -> bool {
                    true
                }
            }
        )*
    };
}

impl_dynamic!(
    Box<dyn Reflect>,
    Box<dyn Reflect + Send + Sync>,
    Rc<dyn Reflect>,
    Arc<dyn Reflect + Send + Sync>,
    &dyn Reflect
);

// Sequences

macro_rules! impl_sequence {
    ($($ty:ident),*) => {
        $(
            impl<T: Reflect> Sequence for $ty<T> {
                fn len(&self) -> usize {
                    $ty::len(self)
                }

                fn elements(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_> {
                    Box::new(self.iter().map(|v| v as &dyn Reflect))
                }

                fn element_recursible(&self) -> bool {
                    T::recursible()
                }
            }

            impl<T: Reflect> Reflect for $ty<T> {
                fn kind(&self) -> Kind<'_> {
                    Kind::Sequence(self)
                }

                fn recursible() -> bool {
                    true
                }
            }
        )*
    };
}

impl_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Reflect, S> Sequence for HashSet<T, S> {
    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn elements(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_> {
        Box::new(self.iter().map(|v| v as &dyn Reflect))
    }

    fn element_recursible(&self) -> bool {
        T::recursible()
    }
}

impl<T: Reflect, S> Reflect for HashSet<T, S> {
    fn kind(&self) -> Kind<'_> {
        Kind::Sequence(self)
    }

    fn recursible() -> bool {
        true
    }
}

impl<T: Reflect, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn elements(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_> {
        Box::new(self.iter().map(|v| v as &dyn Reflect))
    }

    fn element_recursible(&self) -> bool {
        T::recursible()
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn kind(&self) -> Kind<'_> {
        Kind::Sequence(self)
    }

    fn recursible() -> bool {
        true
    }
}

// Mappings

impl<K, V: Reflect, S> Mapping for HashMap<K, V, S> {
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn values(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_> {
        Box::new(HashMap::values(self).map(|v| v as &dyn Reflect))
    }

    fn value_recursible(&self) -> bool {
        V::recursible()
    }
}

impl<K, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn kind(&self) -> Kind<'_> {
        Kind::Mapping(self)
    }

    fn recursible() -> bool {
        true
    }
}

impl<K, V: Reflect> Mapping for BTreeMap<K, V> {
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn values(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_> {
        Box::new(BTreeMap::values(self).map(|v| v as &dyn Reflect))
    }

    fn value_recursible(&self) -> bool {
        V::recursible()
    }
}

impl<K, V: Reflect> Reflect for BTreeMap<K, V> {
    fn kind(&self) -> Kind<'_> {
        Kind::Mapping(self)
    }

    fn recursible() -> bool {
        true
    }
}

// JSON documents

impl Mapping for serde_json::Map<String, serde_json::Value> {
    fn len(&self) -> usize {
        serde_json::Map::len(self)
    }

    fn values(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_> {
        Box::new(serde_json::Map::values(self).map(|v| v as &dyn Reflect))
    }

    fn value_recursible(&self) -> bool {
        true
    }
}

impl Reflect for serde_json::Value {
    fn kind(&self) -> Kind<'_> {
        use serde_json::Value;

        match self {
            Value::Null => Kind::Pointer(None),
            Value::Bool(b) => Kind::Primitive(Primitive::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Kind::Primitive(Primitive::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Kind::Primitive(Primitive::Uint(u))
                } else {
                    Kind::Primitive(Primitive::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => Kind::Primitive(Primitive::Str(s)),
            Value::Array(items) => Kind::Sequence(items),
            Value::Object(map) => Kind::Mapping(map),
        }
    }

    fn recursible() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements_of(value: &dyn Reflect) -> usize {
        match value.kind() {
            Kind::Sequence(seq) => seq.elements().count(),
            Kind::Mapping(map) => map.values().count(),
            other => panic!("not a container: {:?}", other),
        }
    }

    #[test]
    fn test_primitives_widen() {
        assert_eq!(format!("{:?}", (-3i8).kind()), "Primitive(Int(-3))");
        assert_eq!(format!("{:?}", 3u16.kind()), "Primitive(Uint(3))");
        assert_eq!(format!("{:?}", 1.5f32.kind()), "Primitive(Float(1.5))");
        assert_eq!(format!("{:?}", String::from("a").kind()), "Primitive(Str(\"a\"))");
    }

    #[test]
    fn test_recursible_by_type() {
        assert!(!i32::recursible());
        assert!(!String::recursible());
        assert!(Vec::<i32>::recursible());
        assert!(Option::<i32>::recursible());
        assert!(Box::<dyn Reflect>::recursible());
        assert!(HashMap::<String, u8>::recursible());
    }

    #[test]
    fn test_element_recursible() {
        let bytes: Vec<u8> = vec![1, 2, 3];
        let nested: Vec<Option<u8>> = vec![Some(1)];

        match (bytes.kind(), nested.kind()) {
            (Kind::Sequence(a), Kind::Sequence(b)) => {
                assert!(!a.element_recursible());
                assert!(b.element_recursible());
            }
            _ => panic!("expected sequences"),
        }
    }

    #[test]
    fn test_containers_yield_every_element() {
        let mut map = HashMap::new();
        map.insert(1, "a".to_string());
        map.insert(2, "b".to_string());

        assert_eq!(elements_of(&[1u8, 2, 3]), 3);
        assert_eq!(elements_of(&VecDeque::from(vec![1, 2])), 2);
        assert_eq!(elements_of(&map), 2);
    }

    #[test]
    fn test_dynamic_unwraps_to_concrete() {
        let value: Box<dyn Reflect> = Box::new(42u32);
        match value.kind() {
            Kind::Dynamic(Some(inner)) => {
                assert_eq!(inner.type_name(), "u32");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_json_kinds() {
        let doc = serde_json::json!({"a": [1, -2, 3.5], "b": null, "c": "x"});

        assert_eq!(doc.kind().name(), "mapping");
        assert_eq!(doc["a"].kind().name(), "sequence");
        assert_eq!(doc["b"].kind().name(), "pointer");
        assert_eq!(format!("{:?}", doc["a"][1].kind()), "Primitive(Int(-2))");
        assert_eq!(format!("{:?}", doc["c"].kind()), "Primitive(Str(\"x\"))");
    }
}
