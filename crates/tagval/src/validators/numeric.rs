//! Bound rules: `min` and `max`
//!
//! Strings, sequences and mappings are bounded by length; numbers by value.
//! Parameters are parsed once per literal and kept in process-wide caches.

use std::num::ParseFloatError;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::cache::SnapshotCache;
use crate::error::ValidationError;
use crate::reflect::{Kind, Primitive, Reflect};

static INT_LITERALS: Lazy<SnapshotCache<String, i64>> = Lazy::new(SnapshotCache::new);
static UINT_LITERALS: Lazy<SnapshotCache<String, u64>> = Lazy::new(SnapshotCache::new);
static FLOAT_LITERALS: Lazy<SnapshotCache<String, f64>> = Lazy::new(SnapshotCache::new);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    fn rule(self) -> &'static str {
        match self {
            Bound::Min => "min",
            Bound::Max => "max",
        }
    }

    fn relation(self) -> &'static str {
        match self {
            Bound::Min => "less",
            Bound::Max => "greater",
        }
    }

    fn violated<T: PartialOrd>(self, value: T, limit: T) -> bool {
        match self {
            Bound::Min => value < limit,
            Bound::Max => value > limit,
        }
    }
}

/// `min=N`: length or value must be at least `N`
pub fn min(value: &dyn Reflect, name: &str, param: &str) -> Result<(), ValidationError> {
    check(Bound::Min, value, name, param)
}

/// `max=N`: length or value must be at most `N`
pub fn max(value: &dyn Reflect, name: &str, param: &str) -> Result<(), ValidationError> {
    check(Bound::Max, value, name, param)
}

fn check(bound: Bound, value: &dyn Reflect, name: &str, param: &str) -> Result<(), ValidationError> {
    // An absent pointer satisfies any bound
    let Some(kind) = value.kind().resolve() else {
        return Ok(());
    };

    let invalid = |reason: String| ValidationError::invalid_parameter(name, bound.rule(), param, reason);

    if let Some(len) = kind.len() {
        let limit = int_literal(param).map_err(invalid)?;
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        if bound.violated(len, limit) {
            return Err(ValidationError::field(
                name,
                format!(
                    "{} must have length not {} than {} (was {})",
                    name,
                    bound.relation(),
                    param,
                    len
                ),
            ));
        }
        return Ok(());
    }

    let (violated, was) = match kind {
        Kind::Primitive(Primitive::Int(v)) => {
            let limit = int_literal(param).map_err(invalid)?;
            (bound.violated(v, limit), v.to_string())
        }
        Kind::Primitive(Primitive::Uint(v)) => {
            let limit = uint_literal(param).map_err(invalid)?;
            (bound.violated(v, limit), v.to_string())
        }
        Kind::Primitive(Primitive::Float(v)) => {
            let limit = float_literal(param).map_err(|e| invalid(e.to_string()))?;
            (bound.violated(v, limit), v.to_string())
        }
        _ => return Err(ValidationError::unsupported(name)),
    };

    if violated {
        return Err(ValidationError::field(
            name,
            format!(
                "{} must not be {} than {} (was {})",
                name,
                bound.relation(),
                param,
                was
            ),
        ));
    }
    Ok(())
}

fn int_literal(param: &str) -> Result<i64, String> {
    INT_LITERALS.get_or_try_insert_with(param, |literal| {
        let value = parse_int(literal)?;
        debug!(literal, value, "cached integer literal");
        Ok(value)
    })
}

fn uint_literal(param: &str) -> Result<u64, String> {
    UINT_LITERALS.get_or_try_insert_with(param, |literal| {
        if literal.starts_with(['+', '-']) {
            return Err(format!("unsigned literal {:?} must not carry a sign", literal));
        }
        let (digits, radix) = split_radix(literal)?;
        let value = u64::from_str_radix(&digits, radix).map_err(|e| e.to_string())?;
        debug!(literal, value, "cached unsigned literal");
        Ok(value)
    })
}

fn float_literal(param: &str) -> Result<f64, ParseFloatError> {
    FLOAT_LITERALS.get_or_try_insert_with(param, |literal| {
        let value = literal.parse::<f64>()?;
        debug!(literal, value, "cached float literal");
        Ok(value)
    })
}

/// Parse a signed integer literal, inferring the radix from its prefix
fn parse_int(literal: &str) -> Result<i64, String> {
    let (negative, unsigned) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };
    let (digits, radix) = split_radix(unsigned)?;
    // Parse with the sign attached so i64::MIN stays representable
    let signed = if negative {
        format!("-{}", digits)
    } else {
        digits
    };
    i64::from_str_radix(&signed, radix).map_err(|e| e.to_string())
}

/// Strip a `0x`, `0o`, `0b` or leading `0` prefix and return the digits
/// with their radix and underscores removed
fn split_radix(literal: &str) -> Result<(String, u32), String> {
    let lower = literal.get(..2).map(str::to_ascii_lowercase);
    let (rest, radix, prefixed) = match lower.as_deref() {
        Some("0x") => (&literal[2..], 16, true),
        Some("0o") => (&literal[2..], 8, true),
        Some("0b") => (&literal[2..], 2, true),
        _ if literal.len() > 1 && literal.starts_with('0') => (&literal[1..], 8, true),
        _ => (literal, 10, false),
    };
    if !underscores_ok(rest, prefixed) {
        return Err(format!("misplaced underscore in {:?}", literal));
    }
    Ok((rest.replace('_', ""), radix))
}

/// Each underscore sits between two digits, or between the prefix and a digit
fn underscores_ok(digits: &str, prefixed: bool) -> bool {
    let bytes = digits.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        if b != b'_' {
            return true;
        }
        let before = if i == 0 { prefixed } else { bytes[i - 1] != b'_' };
        before && matches!(bytes.get(i + 1), Some(&next) if next != b'_')
    })
}
