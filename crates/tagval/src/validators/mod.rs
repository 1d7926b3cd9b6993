//! Built-in rules
//!
//! | name       | applies to                             |
//! |------------|----------------------------------------|
//! | `notempty` | strings, containers, scalars, pointers |
//! | `notnil`   | pointers and dynamic values            |
//! | `min`      | lengths and numbers                    |
//! | `max`      | lengths and numbers                    |
//! | `regex`    | scalars                                |
//! | `date`     | strings                                |

pub mod date;
pub mod numeric;
pub mod pattern;
pub mod required;

pub use date::date;
pub use numeric::{max, min};
pub use pattern::regex;
pub use required::{not_empty, not_nil};

use crate::config::DEFAULT_TAG_NAME;
use crate::validator::{Configure, Validator};

/// Use the default tag name and register every built-in rule
pub fn default_rules() -> Configure {
    Box::new(|v: &mut Validator| {
        v.set_tag_name(DEFAULT_TAG_NAME);
        v.register("notempty", not_empty);
        v.register("notnil", not_nil);
        v.register("min", min);
        v.register("max", max);
        v.register("regex", regex);
        v.register("date", date);
    })
}
