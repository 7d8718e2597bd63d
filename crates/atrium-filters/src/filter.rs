//! Typed list filters
//!
//! Each filter kind is an explicit struct behind the `Filter` trait:
//! `SelectFilter` (closed option set), `InputFilter` (free text) and
//! `PageFilter` (page number compiling to an offset/limit window). Filter
//! ids become form-field names, so construction fails fast on anything
//! outside `^[A-Za-z0-9_-]+$`.

use atrium_core::{Error, RequestContext, Result};
use regex::Regex;
use std::sync::OnceLock;

use crate::params::{FilterValues, ParamBag, ParamRule, ParamValue};

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z0-9_-]+$").expect("static pattern"))
}

/// Validated filter identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterId(String);

impl FilterId {
    /// Validate and wrap an identifier; hard error on violation
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || !id_pattern().is_match(&id) {
            return Err(Error::invalid_filter_id(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A named, request-bindable list filter
pub trait Filter {
    fn id(&self) -> &str;

    fn title(&self) -> &str;

    /// Placement hint: prime filters render in the primary region
    fn prime(&self) -> bool;

    /// Source the value from the request, once
    ///
    /// The first call defaults an unset value from the query parameters;
    /// later calls never overwrite it.
    fn parse(&mut self, ctx: &RequestContext);

    /// Parsed value; None or empty means unset
    fn value(&self) -> Option<String>;

    /// Configured fallback default, when any
    fn default_value(&self) -> Option<String> {
        None
    }

    /// Explicitly set the value (wins over request defaulting)
    fn set_value(&mut self, value: &str);

    /// Page filters react to the parsed page-size filter; others ignore it
    fn set_page_size(&mut self, _size: u64) {}

    /// Whether the parsed value differs from the empty default
    fn is_set(&self) -> bool {
        self.value().is_some_and(|v| !v.is_empty())
    }

    /// Compile this filter's parameter rules into the bag (only when set)
    fn compile(&self, bag: &mut ParamBag);
}

/// Closed-option select filter
pub struct SelectFilter {
    id: FilterId,
    title: String,
    prime: bool,
    /// Ordered (label, value) pairs
    options: Vec<(String, String)>,
    value: Option<String>,
    default: Option<String>,
    parsed: bool,
    rules: Vec<ParamRule>,
}

impl SelectFilter {
    pub fn new(id: &str, title: impl Into<String>) -> Result<Self> {
        Ok(Self {
            id: FilterId::new(id)?,
            title: title.into(),
            prime: false,
            options: Vec::new(),
            value: None,
            default: None,
            parsed: false,
            rules: Vec::new(),
        })
    }

    /// Fallback used when the request carries no (valid) value
    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn with_options(mut self, options: Vec<(String, String)>) -> Self {
        self.options = options;
        self
    }

    pub fn with_prime(mut self, prime: bool) -> Self {
        self.prime = prime;
        self
    }

    pub fn with_rule(mut self, rule: ParamRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }
}

impl Filter for SelectFilter {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn prime(&self) -> bool {
        self.prime
    }

    fn parse(&mut self, ctx: &RequestContext) {
        if self.parsed {
            return;
        }
        if self.value.is_none() {
            // Accept the request value only when it is a declared option;
            // anything else resolves to the configured default, or stays
            // unset.
            self.value = ctx
                .query(self.id.as_str())
                .filter(|v| self.options.iter().any(|(_, value)| value == v))
                .map(str::to_string)
                .or_else(|| self.default.clone());
        }
        self.parsed = true;
    }

    fn value(&self) -> Option<String> {
        self.value.clone()
    }

    fn default_value(&self) -> Option<String> {
        self.default.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.value = Some(value.to_string());
    }

    fn compile(&self, bag: &mut ParamBag) {
        let Some(value) = self.value.as_ref().filter(|v| !v.is_empty()) else {
            return;
        };
        let values = FilterValues::new(vec![ParamValue::Str(value.clone())]);
        apply_rules(&self.rules, &values, value, bag);
    }
}

/// Free-text input filter
pub struct InputFilter {
    id: FilterId,
    title: String,
    prime: bool,
    value: Option<String>,
    default: Option<String>,
    parsed: bool,
    rules: Vec<ParamRule>,
}

impl InputFilter {
    pub fn new(id: &str, title: impl Into<String>) -> Result<Self> {
        Ok(Self {
            id: FilterId::new(id)?,
            title: title.into(),
            prime: false,
            value: None,
            default: None,
            parsed: false,
            rules: Vec::new(),
        })
    }

    /// Fallback used when the request carries no value
    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn with_prime(mut self, prime: bool) -> Self {
        self.prime = prime;
        self
    }

    pub fn with_rule(mut self, rule: ParamRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }
}

impl Filter for InputFilter {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn prime(&self) -> bool {
        self.prime
    }

    fn parse(&mut self, ctx: &RequestContext) {
        if self.parsed {
            return;
        }
        if self.value.is_none() {
            // No membership check for free text; empty string default.
            self.value = Some(
                ctx.query(self.id.as_str())
                    .map(str::to_string)
                    .or_else(|| self.default.clone())
                    .unwrap_or_default(),
            );
        }
        self.parsed = true;
    }

    fn value(&self) -> Option<String> {
        self.value.clone()
    }

    fn default_value(&self) -> Option<String> {
        self.default.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.value = Some(value.to_string());
    }

    fn compile(&self, bag: &mut ParamBag) {
        let Some(value) = self.value.as_ref().filter(|v| !v.is_empty()) else {
            return;
        };
        let values = FilterValues::new(vec![ParamValue::Str(value.clone())]);
        apply_rules(&self.rules, &values, value, bag);
    }
}

/// Page-number filter compiling to an `(offset, limit)` window
pub struct PageFilter {
    id: FilterId,
    page: u64,
    page_size: u64,
    parsed: bool,
}

impl PageFilter {
    pub fn new(page_size: u64) -> Self {
        Self {
            // "page" always passes the id pattern
            id: FilterId::new("page").expect("static id"),
            page: 1,
            page_size: page_size.max(1),
            parsed: false,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }
}

impl Filter for PageFilter {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn title(&self) -> &str {
        "page"
    }

    fn prime(&self) -> bool {
        false
    }

    fn parse(&mut self, ctx: &RequestContext) {
        if self.parsed {
            return;
        }
        // Non-numeric or out-of-range page parameters resolve to page 1.
        self.page = ctx
            .query(self.id.as_str())
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        self.parsed = true;
    }

    fn value(&self) -> Option<String> {
        Some(self.page.to_string())
    }

    fn set_value(&mut self, value: &str) {
        self.page = value.parse::<u64>().ok().filter(|p| *p >= 1).unwrap_or(1);
    }

    fn set_page_size(&mut self, size: u64) {
        self.page_size = size.max(1);
    }

    fn is_set(&self) -> bool {
        self.page > 1
    }

    fn compile(&self, bag: &mut ParamBag) {
        bag.set(
            "limit",
            ParamValue::Range {
                offset: (self.page - 1) * self.page_size,
                limit: self.page_size,
            },
        );
    }
}

fn apply_rules(rules: &[ParamRule], values: &FilterValues, raw: &str, bag: &mut ParamBag) {
    if rules.is_empty() {
        return;
    }
    for rule in rules {
        match rule {
            ParamRule::Literal { key, value } => bag.set(key, value.clone()),
            ParamRule::Value { key } => bag.set(key, ParamValue::Str(raw.to_string())),
            ParamRule::Derived { key, derive } => bag.set(key, derive(values)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(FilterId::new("abc-1_2").is_ok());
        assert!(FilterId::new("sortby").is_ok());
    }

    #[test]
    fn test_invalid_ids_fail_fast() {
        assert!(matches!(
            FilterId::new("bad id!"),
            Err(Error::InvalidFilterId { .. })
        ));
        assert!(matches!(FilterId::new(""), Err(Error::InvalidFilterId { .. })));
        assert!(FilterId::new("a b").is_err());
    }

    #[test]
    fn test_select_rejects_unknown_request_value() {
        let mut f = SelectFilter::new("state", "State")
            .unwrap()
            .with_options(vec![
                ("Enabled".into(), "enabled".into()),
                ("Disabled".into(), "disabled".into()),
            ]);
        let ctx = RequestContext::new("/").with_query("state", "'; DROP TABLE");
        f.parse(&ctx);
        assert_eq!(f.value(), None);
        assert!(!f.is_set());
    }

    #[test]
    fn test_select_accepts_declared_option() {
        let mut f = SelectFilter::new("state", "State")
            .unwrap()
            .with_options(vec![("Enabled".into(), "enabled".into())]);
        let ctx = RequestContext::new("/").with_query("state", "enabled");
        f.parse(&ctx);
        assert_eq!(f.value().as_deref(), Some("enabled"));
        assert!(f.is_set());
    }

    #[test]
    fn test_parse_defaults_only_once() {
        let mut f = InputFilter::new("q", "Search").unwrap();
        let first = RequestContext::new("/").with_query("q", "spam");
        let second = RequestContext::new("/").with_query("q", "other");
        f.parse(&first);
        f.parse(&second);
        assert_eq!(f.value().as_deref(), Some("spam"));
    }

    #[test]
    fn test_explicit_value_wins_over_request() {
        let mut f = SelectFilter::new("state", "State")
            .unwrap()
            .with_options(vec![("Enabled".into(), "enabled".into())])
            .with_value("enabled");
        let ctx = RequestContext::new("/").with_query("state", "disabled");
        f.parse(&ctx);
        assert_eq!(f.value().as_deref(), Some("enabled"));
    }

    #[test]
    fn test_input_compile_with_value_rule() {
        let mut bag = ParamBag::new();
        let f = InputFilter::new("author", "Author")
            .unwrap()
            .with_rule(ParamRule::value("author"))
            .with_value("Atrium Team");
        f.compile(&mut bag);
        assert_eq!(
            bag.get("author").and_then(|v| v.as_str()),
            Some("Atrium Team")
        );
    }

    #[test]
    fn test_unset_filter_compiles_nothing() {
        let mut bag = ParamBag::new();
        let f = InputFilter::new("author", "Author")
            .unwrap()
            .with_rule(ParamRule::value("author"));
        f.compile(&mut bag);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_page_filter_window() {
        let mut f = PageFilter::new(25);
        let ctx = RequestContext::new("/").with_query("page", "3");
        f.parse(&ctx);
        let mut bag = ParamBag::new();
        f.compile(&mut bag);
        assert_eq!(
            bag.get("limit"),
            Some(&ParamValue::Range {
                offset: 50,
                limit: 25
            })
        );
    }

    #[test]
    fn test_page_filter_bad_input_clamps_to_one() {
        let mut f = PageFilter::new(10);
        let ctx = RequestContext::new("/").with_query("page", "banana");
        f.parse(&ctx);
        assert_eq!(f.page(), 1);
        assert!(!f.is_set());

        let mut zero = PageFilter::new(10);
        let ctx = RequestContext::new("/").with_query("page", "0");
        zero.parse(&ctx);
        assert_eq!(zero.page(), 1);
    }
}
