//! Compiled query-parameter bag
//!
//! Filters compile into a `ParamBag` handed to the backend query layer.
//! Most keys are last-write-wins; the SQL-ish keys `from`, `where` and
//! `sql` concatenate across filters and `columns` lists merge.

use std::collections::HashMap;

/// A compiled parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Num(i64),
    Bool(bool),
    List(Vec<String>),
    /// Pagination window: `(offset, limit)`
    Range { offset: u64, limit: u64 },
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Positional values a derived rule is invoked with
///
/// Index 0 is the filter's parsed value; extra slots (e.g. the page size
/// next to a page number) follow in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FilterValues {
    values: Vec<ParamValue>,
}

impl FilterValues {
    pub fn new(values: Vec<ParamValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&ParamValue> {
        self.values.get(index)
    }

    /// The parsed filter value (slot 0)
    pub fn value(&self) -> Option<&ParamValue> {
        self.get(0)
    }
}

/// Compilation strategy for one `(key, value)` pair of a filter
///
/// A closed set replaces the legacy callable-as-data entries: either the
/// literal value, the filter's own parsed value, or a pure function of the
/// positional values.
#[derive(Debug, Clone)]
pub enum ParamRule {
    Literal { key: String, value: ParamValue },
    Value { key: String },
    Derived { key: String, derive: fn(&FilterValues) -> ParamValue },
}

impl ParamRule {
    pub fn literal(key: impl Into<String>, value: ParamValue) -> Self {
        Self::Literal {
            key: key.into(),
            value,
        }
    }

    pub fn value(key: impl Into<String>) -> Self {
        Self::Value { key: key.into() }
    }

    pub fn derived(key: impl Into<String>, derive: fn(&FilterValues) -> ParamValue) -> Self {
        Self::Derived {
            key: key.into(),
            derive,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Literal { key, .. } | Self::Value { key } | Self::Derived { key, .. } => key,
        }
    }
}

/// Keys whose string values concatenate instead of overwriting
const CONCAT_KEYS: &[&str] = &["from", "where", "sql"];

/// Key whose list values merge instead of overwriting
const MERGE_KEY: &str = "columns";

/// Backend query parameter bag
#[derive(Debug, Clone, Default)]
pub struct ParamBag {
    entries: HashMap<String, ParamValue>,
}

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value applying the concat/merge/overwrite policy
    pub fn set(&mut self, key: &str, value: ParamValue) {
        if CONCAT_KEYS.contains(&key) {
            if let (Some(ParamValue::Str(existing)), ParamValue::Str(new)) =
                (self.entries.get_mut(key), &value)
            {
                existing.push(' ');
                existing.push_str(new);
                return;
            }
        } else if key == MERGE_KEY {
            if let (Some(ParamValue::List(existing)), ParamValue::List(new)) =
                (self.entries.get_mut(key), &value)
            {
                existing.extend(new.iter().cloned());
                return;
            }
        }
        self.entries.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.entries.iter()
    }
}
