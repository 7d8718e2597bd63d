//! Filter sets attached to one admin list
//!
//! A `FilterSet` owns the named filters of a list view, parses them from
//! the request once, exposes the show latch and compiles the final query
//! parameter bag. Sort filters (`sortby`, `order`, `nb`) default from the
//! per-user preference store and are kept out of the content-filter
//! region.

use atrium_core::{PreferenceStore, RequestContext, SortPrefs};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::filter::{Filter, InputFilter, PageFilter, SelectFilter};
use crate::params::{ParamBag, ParamValue};

/// Ids of the sort family, persisted to preferences and excluded from the
/// content region
const SORT_IDS: &[&str] = &["sortby", "order", "nb"];

/// Ordered collection of the filters bound to one list
pub struct FilterSet {
    /// List type ("plugins", "themes", ...) used as the preference key
    list_type: String,

    filters: Vec<Box<dyn Filter>>,

    /// Value each filter carried when it was added; the show latch
    /// compares parsed values against these
    defaults: HashMap<String, Option<String>>,

    show: bool,
}

impl FilterSet {
    pub fn new(list_type: impl Into<String>) -> Self {
        Self {
            list_type: list_type.into(),
            filters: Vec::new(),
            defaults: HashMap::new(),
            show: false,
        }
    }

    /// Attach the sort family (`sortby`, `order`, `nb`) plus the page
    /// filter, defaulting from the per-user preference store
    pub fn with_sort(
        mut self,
        prefs: &dyn PreferenceStore,
        sortby_options: Vec<(String, String)>,
    ) -> Self {
        let triple = prefs
            .sort_prefs(&self.list_type)
            .unwrap_or_default();

        // Static ids, the constructors cannot fail.
        let sortby = SelectFilter::new("sortby", "Sort by")
            .expect("static id")
            .with_options(sortby_options)
            .with_default(&triple.sortby);
        let order = SelectFilter::new("order", "Order")
            .expect("static id")
            .with_options(vec![
                ("Ascending".to_string(), "asc".to_string()),
                ("Descending".to_string(), "desc".to_string()),
            ])
            .with_default(&triple.order);
        let nb = InputFilter::new("nb", "Items per page")
            .expect("static id")
            .with_default(&triple.page_size.to_string());

        self.add(Some(Box::new(sortby)));
        self.add(Some(Box::new(order)));
        self.add(Some(Box::new(nb)));
        self.add(Some(Box::new(PageFilter::new(triple.page_size as u64))));
        self
    }

    /// Register a filter; silently no-ops on None
    ///
    /// Deliberately permissive: optional filters whose backing collection
    /// turned out empty are passed as None by callers. A filter reusing an
    /// existing id replaces it.
    pub fn add(&mut self, filter: Option<Box<dyn Filter>>) -> &mut Self {
        let Some(filter) = filter else {
            return self;
        };
        let id = filter.id().to_string();
        self.defaults
            .insert(id.clone(), filter.value().or_else(|| filter.default_value()));
        if let Some(slot) = self.filters.iter_mut().find(|f| f.id() == id) {
            *slot = filter;
        } else {
            self.filters.push(filter);
        }
        self
    }

    /// Register a bare id with a default value, wrapped as an input filter
    ///
    /// Invalid or empty ids are ignored rather than raised: the id comes
    /// from caller-assembled lists where absence is routine.
    pub fn add_value(&mut self, id: &str, value: &str) -> &mut Self {
        match InputFilter::new(id, id) {
            Ok(filter) => self.add(Some(Box::new(filter.with_value(value)))),
            Err(_) => {
                warn!("Ignoring filter with invalid id: '{}'", id);
                self
            }
        }
    }

    /// Parse every filter against the request and update the show latch
    pub fn parse(&mut self, ctx: &RequestContext) {
        for filter in &mut self.filters {
            filter.parse(ctx);
        }

        // A request-supplied page size reshapes the page filter's window.
        if let Some(nb) = self.value("nb").and_then(|v| v.parse::<u64>().ok()) {
            for filter in &mut self.filters {
                filter.set_page_size(nb);
            }
        }

        let changed = self.filters.iter().any(|f| {
            let default = self.defaults.get(f.id()).cloned().flatten();
            let parsed = f.value().filter(|v| !v.is_empty());
            parsed.is_some() && parsed != default
        });
        if changed {
            debug!("Filter values differ from defaults; expanding filter region");
            self.show = true;
        }
    }

    /// Set-once latch controlling whether the filter region is expanded
    pub fn show(&mut self, set: bool) -> bool {
        if set {
            self.show = true;
        }
        self.show
    }

    /// Parsed value of a filter; unknown ids yield None
    pub fn value(&self, id: &str) -> Option<String> {
        self.filters
            .iter()
            .find(|f| f.id() == id)
            .and_then(|f| f.value())
    }

    /// Drop a filter; unknown ids yield false
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.id() != id);
        self.defaults.remove(id);
        self.filters.len() != before
    }

    /// Ids of the content filters (everything outside the sort family and
    /// the page filter), in registration order
    pub fn content_filters(&self) -> Vec<&str> {
        self.filters
            .iter()
            .map(|f| f.id())
            .filter(|id| !SORT_IDS.contains(id) && *id != "page")
            .collect()
    }

    /// Compile the set into a backend query parameter bag
    ///
    /// `sortby` and `order` fuse into a single `order` entry when both are
    /// non-empty; everything else compiles through its own rules.
    pub fn params(&self) -> ParamBag {
        let mut bag = ParamBag::new();
        for filter in &self.filters {
            if filter.id() == "sortby" || filter.id() == "order" {
                continue;
            }
            filter.compile(&mut bag);
        }

        let sortby = self.value("sortby").filter(|v| !v.is_empty());
        let order = self.value("order").filter(|v| !v.is_empty());
        if let (Some(col), Some(dir)) = (sortby, order) {
            bag.set("order", ParamValue::Str(format!("{col} {dir}")));
        }
        bag
    }

    /// Persist the current sort triple to the preference store
    pub fn save_sort_prefs(&self, store: &mut dyn PreferenceStore) {
        let triple = SortPrefs {
            sortby: self.value("sortby").unwrap_or_default(),
            order: self.value("order").unwrap_or_default(),
            page_size: self
                .value("nb")
                .and_then(|v| v.parse().ok())
                .unwrap_or(atrium_core::config::DEFAULT_PAGE_SIZE),
        };
        store.save_sort_prefs(&self.list_type, &triple);
    }

    pub fn list_type(&self) -> &str {
        &self.list_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::MemoryPrefs;

    fn state_filter() -> Box<dyn Filter> {
        Box::new(
            SelectFilter::new("state", "State")
                .unwrap()
                .with_options(vec![
                    ("Enabled".into(), "enabled".into()),
                    ("Disabled".into(), "disabled".into()),
                ])
                .with_rule(crate::params::ParamRule::value("state")),
        )
    }

    #[test]
    fn test_add_none_is_noop() {
        let mut set = FilterSet::new("plugins");
        set.add(None);
        assert!(set.content_filters().is_empty());
    }

    #[test]
    fn test_add_value_rejects_invalid_id_silently() {
        let mut set = FilterSet::new("plugins");
        set.add_value("bad id!", "x").add_value("", "y");
        assert!(set.content_filters().is_empty());

        set.add_value("section", "widgets");
        assert_eq!(set.content_filters(), vec!["section"]);
        assert_eq!(set.value("section").as_deref(), Some("widgets"));
    }

    #[test]
    fn test_unknown_id_neutral_defaults() {
        let mut set = FilterSet::new("plugins");
        assert_eq!(set.value("ghost"), None);
        assert!(!set.remove("ghost"));
    }

    #[test]
    fn test_show_latch_is_set_once() {
        let mut set = FilterSet::new("plugins");
        assert!(!set.show(false));
        assert!(set.show(true));
        assert!(set.show(false));
    }

    #[test]
    fn test_parse_flips_show_on_non_default_value() {
        let mut set = FilterSet::new("plugins");
        set.add(Some(state_filter()));
        set.parse(&RequestContext::new("/").with_query("state", "disabled"));
        assert!(set.show(false));
    }

    #[test]
    fn test_parse_keeps_show_unset_without_values() {
        let mut set = FilterSet::new("plugins");
        set.add(Some(state_filter()));
        set.parse(&RequestContext::new("/"));
        assert!(!set.show(false));
    }

    #[test]
    fn test_params_compilation_and_order_fusion() {
        let prefs = MemoryPrefs::default();
        let mut set = FilterSet::new("plugins").with_sort(
            &prefs,
            vec![
                ("Name".into(), "sname".into()),
                ("Author".into(), "author".into()),
            ],
        );
        set.add(Some(state_filter()));
        set.parse(&RequestContext::new("/").with_query("state", "enabled"));

        let bag = set.params();
        assert_eq!(bag.get("state").and_then(|v| v.as_str()), Some("enabled"));
        assert_eq!(bag.get("order").and_then(|v| v.as_str()), Some("sname asc"));
        assert_eq!(
            bag.get("limit"),
            Some(&ParamValue::Range {
                offset: 0,
                limit: 10
            })
        );
    }

    #[test]
    fn test_sort_defaults_come_from_prefs() {
        let mut prefs = MemoryPrefs::default();
        prefs.save_sort_prefs(
            "plugins",
            &SortPrefs {
                sortby: "author".into(),
                order: "desc".into(),
                page_size: 30,
            },
        );
        let mut set =
            FilterSet::new("plugins").with_sort(&prefs, vec![("Author".into(), "author".into())]);
        set.parse(&RequestContext::new("/"));

        let bag = set.params();
        assert_eq!(
            bag.get("order").and_then(|v| v.as_str()),
            Some("author desc")
        );
        assert_eq!(
            bag.get("limit"),
            Some(&ParamValue::Range {
                offset: 0,
                limit: 30
            })
        );
    }

    #[test]
    fn test_sort_family_excluded_from_content_filters() {
        let prefs = MemoryPrefs::default();
        let mut set = FilterSet::new("plugins").with_sort(&prefs, vec![]);
        set.add(Some(state_filter()));
        assert_eq!(set.content_filters(), vec!["state"]);
    }

    #[test]
    fn test_save_sort_prefs_roundtrip() {
        let mut prefs = MemoryPrefs::default();
        let mut set = FilterSet::new("themes").with_sort(&prefs, vec![]);
        set.parse(
            &RequestContext::new("/")
                .with_query("sortby", "sname")
                .with_query("order", "desc"),
        );
        set.save_sort_prefs(&mut prefs);

        let saved = prefs.sort_prefs("themes").unwrap();
        // sortby has no declared options here, so the request value is
        // rejected and the pref default survives; order is a valid option
        // and comes from the request
        assert_eq!(saved.sortby, "sname");
        assert_eq!(saved.order, "desc");
        assert_eq!(saved.page_size, 10);
    }

    #[test]
    fn test_request_page_size_reshapes_window() {
        let prefs = MemoryPrefs::default();
        let mut set = FilterSet::new("plugins").with_sort(&prefs, vec![]);
        set.parse(
            &RequestContext::new("/")
                .with_query("nb", "50")
                .with_query("page", "2"),
        );
        let bag = set.params();
        assert_eq!(
            bag.get("limit"),
            Some(&ParamValue::Range {
                offset: 50,
                limit: 50
            })
        );
    }
}
