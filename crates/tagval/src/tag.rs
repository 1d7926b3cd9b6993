//! Rule string parsing.
//!
//! A rule string is a comma separated list of `name` or `name=param`
//! entries. The first `=` splits name from parameter. There is no escaping,
//! so a parameter cannot contain a `,`.

/// One `name[=param]` entry of a rule string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec<'a> {
    pub name: &'a str,
    pub param: &'a str,
}

/// Lazy iterator over the entries of a rule string, left to right
#[derive(Debug, Clone)]
pub struct RuleSpecs<'a> {
    rest: &'a str,
}

impl<'a> Iterator for RuleSpecs<'a> {
    type Item = RuleSpec<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let entry = match self.rest.split_once(',') {
            Some((entry, rest)) => {
                self.rest = rest;
                entry
            }
            None => std::mem::take(&mut self.rest),
        };
        Some(parse_rule(entry))
    }
}

/// Split a rule string into its entries
pub fn parse_rules(rules: &str) -> RuleSpecs<'_> {
    RuleSpecs { rest: rules }
}

/// Split one entry into rule name and parameter
pub fn parse_rule(entry: &str) -> RuleSpec<'_> {
    match entry.split_once('=') {
        Some((name, param)) => RuleSpec { name, param },
        None => RuleSpec { name: entry, param: "" },
    }
}

/// First value stored under `key` in a field's tag pairs
pub fn lookup<'a>(tags: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}
