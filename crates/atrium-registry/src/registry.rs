//! In-memory module catalog with sort, search and index navigation
//!
//! A `ModuleRegistry` is rebuilt per invocation from the installed-module
//! source (and optionally the remote feed), then queried for ordered,
//! searched or bucketed views of the collection. It holds no filesystem
//! state of its own; actions go through the dispatcher.

use atrium_core::types::{FeedEntry, ModuleInfo};
use atrium_core::utils::index_char;
use semver::Version;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Minimum trimmed length for a search query to take effect
const SEARCH_MIN_LEN: usize = 2;

/// One slot of the alphabetic index navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// `a..z` or `0..9`
    Char(char),
    /// Everything that does not start with an ascii letter or digit
    Other,
}

impl IndexKey {
    fn of(value: &str) -> Self {
        match index_char(value) {
            Some(c) => IndexKey::Char(c),
            None => IndexKey::Other,
        }
    }

    /// The fixed navigation alphabet: 26 letters, 10 digits, one catch-all
    pub fn alphabet() -> impl Iterator<Item = IndexKey> {
        ('a'..='z')
            .chain('0'..='9')
            .map(IndexKey::Char)
            .chain(std::iter::once(IndexKey::Other))
    }
}

/// Rendering state of one index bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketState {
    /// Has members and is not the current selection; linkable
    Reachable,
    /// The currently selected bucket; inert
    Active,
    /// No members; inert and disabled
    Empty,
}

/// One entry of the index navigation strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBucket {
    pub key: IndexKey,
    pub count: usize,
    pub state: BucketState,
}

/// Catalog of modules for one admin list
pub struct ModuleRegistry {
    list_type: String,
    list_id: String,
    modules: HashMap<String, ModuleInfo>,
    insertion_order: Vec<String>,
    sort_field: String,
    sort_asc: bool,
    search: Option<String>,
    index: Option<IndexKey>,
}

impl ModuleRegistry {
    /// `list_type` distinguishes plugins from themes ("plugins"/"themes")
    pub fn new(list_type: impl Into<String>) -> Self {
        Self {
            list_type: list_type.into(),
            list_id: "installed".to_string(),
            modules: HashMap::new(),
            insertion_order: Vec::new(),
            sort_field: "sname".to_string(),
            sort_asc: true,
            search: None,
            index: None,
        }
    }

    pub fn list_type(&self) -> &str {
        &self.list_type
    }

    /// Namespace for concurrent lists on one page ("installed", "update", ...)
    pub fn set_list(&mut self, list_id: impl Into<String>) -> &mut Self {
        self.list_id = list_id.into();
        self
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    /// Load the collection, sanitizing every entry
    ///
    /// Sanitization is idempotent so re-feeding an already-sanitized map
    /// is safe. Insertion order is retained for stable sorting.
    pub fn set_modules(&mut self, raw: HashMap<String, ModuleInfo>) -> &mut Self {
        self.modules.clear();
        self.insertion_order.clear();
        let mut ids: Vec<String> = raw.keys().cloned().collect();
        ids.sort();
        for id in ids {
            let mut module = raw[&id].clone();
            module.sanitize();
            self.insertion_order.push(module.id.clone());
            self.modules.insert(module.id.clone(), module);
        }
        debug!("Registry {} loaded {} modules", self.list_type, self.modules.len());
        self
    }

    pub fn modules(&self) -> &HashMap<String, ModuleInfo> {
        &self.modules
    }

    pub fn module(&self, id: &str) -> Option<&ModuleInfo> {
        self.modules.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn set_sort(&mut self, field: impl Into<String>, ascending: bool) -> &mut Self {
        self.sort_field = field.into();
        self.sort_asc = ascending;
        self
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    /// Stable sort of a module list by a named field
    ///
    /// A module missing the field sorts by the field name itself, a
    /// deliberate legacy fallback keeping such entries grouped together
    /// instead of erroring. Ties keep their input order.
    pub fn sort_modules(modules: &[ModuleInfo], field: &str, ascending: bool) -> Vec<ModuleInfo> {
        let mut sorted: Vec<ModuleInfo> = modules.to_vec();
        sorted.sort_by(|a, b| {
            let ord = sort_key(a, field).cmp(&sort_key(b, field));
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        sorted
    }

    /// The collection ordered by the current sort settings
    pub fn sorted(&self) -> Vec<ModuleInfo> {
        let in_order: Vec<ModuleInfo> = self
            .insertion_order
            .iter()
            .filter_map(|id| self.modules.get(id).cloned())
            .collect();
        Self::sort_modules(&in_order, &self.sort_field, self.sort_asc)
    }

    /// Select an index bucket; None clears the selection
    pub fn set_index(&mut self, index: Option<IndexKey>) -> &mut Self {
        self.index = index;
        self
    }

    /// The index navigation strip over the current sort field
    ///
    /// Suppressed (empty) while a search is active or the collection is
    /// empty; the index competes with search for the same narrowing role.
    pub fn index_buckets(&self) -> Vec<IndexBucket> {
        if self.search.is_some() || self.modules.is_empty() {
            return Vec::new();
        }

        let mut counts: HashMap<IndexKey, usize> = HashMap::new();
        for module in self.modules.values() {
            let value = module
                .field(&self.sort_field)
                .unwrap_or_else(|| self.sort_field.clone());
            *counts.entry(IndexKey::of(&value)).or_insert(0) += 1;
        }

        IndexKey::alphabet()
            .map(|key| {
                let count = counts.get(&key).copied().unwrap_or(0);
                let state = if self.index == Some(key) {
                    BucketState::Active
                } else if count > 0 {
                    BucketState::Reachable
                } else {
                    BucketState::Empty
                };
                IndexBucket { key, count, state }
            })
            .collect()
    }

    /// Modules belonging to the selected index bucket (all when unselected)
    pub fn index_results(&self) -> Vec<ModuleInfo> {
        let Some(selected) = self.index else {
            return self.sorted();
        };
        self.sorted()
            .into_iter()
            .filter(|m| {
                let value = m
                    .field(&self.sort_field)
                    .unwrap_or_else(|| self.sort_field.clone());
                IndexKey::of(&value) == selected
            })
            .collect()
    }

    /// Register a search query; shorter than 2 trimmed characters clears it
    pub fn set_search(&mut self, query: Option<&str>) -> &mut Self {
        self.search = query
            .map(str::trim)
            .filter(|q| q.len() >= SEARCH_MIN_LEN)
            .map(str::to_string);
        self
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Modules matching every space-separated search term
    ///
    /// Terms match case-insensitively against id, name, description,
    /// author and tags. Without an active query the full ordered
    /// collection is returned.
    pub fn search_results(&self) -> Vec<ModuleInfo> {
        let Some(query) = &self.search else {
            return self.sorted();
        };
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        self.sorted()
            .into_iter()
            .filter(|m| {
                let haystack = format!(
                    "{} {} {} {} {}",
                    m.id,
                    m.name,
                    m.description,
                    m.author,
                    m.tags.join(" ")
                )
                .to_lowercase();
                terms.iter().all(|t| haystack.contains(t))
            })
            .collect()
    }

    /// Stamp installed modules with the feed's advertised versions
    pub fn merge_feed(&mut self, feed: &HashMap<String, FeedEntry>) -> &mut Self {
        for (id, entry) in feed {
            if let Some(module) = self.modules.get_mut(id) {
                module.current_version = entry.version.clone();
            }
        }
        self
    }

    /// Installed modules whose feed version is newer than the local one
    pub fn updatable_modules(&self) -> Vec<&ModuleInfo> {
        let mut updatable: Vec<&ModuleInfo> = self
            .modules
            .values()
            .filter(|m| version_newer(&m.current_version, &m.version))
            .collect();
        updatable.sort_by(|a, b| a.id.cmp(&b.id));
        updatable
    }
}

fn sort_key(module: &ModuleInfo, field: &str) -> String {
    module
        .field(field)
        .unwrap_or_else(|| field.to_string())
        .to_lowercase()
}

/// Whether `candidate` is a strictly newer version than `installed`
///
/// Versions are parsed leniently: missing minor/patch components are
/// padded with zeros, anything unparseable compares as not-newer.
pub fn version_newer(candidate: &str, installed: &str) -> bool {
    match (parse_lenient(candidate), parse_lenient(installed)) {
        (Some(c), Some(i)) => c > i,
        _ => false,
    }
}

fn parse_lenient(version: &str) -> Option<Version> {
    let trimmed = version.trim().trim_start_matches('v');
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = Version::parse(trimmed) {
        return Some(v);
    }
    // Pad "2" and "2.1" style versions out to full semver
    let dots = trimmed.chars().filter(|c| *c == '.').count();
    let padded = match dots {
        0 => format!("{trimmed}.0.0"),
        1 => format!("{trimmed}.0"),
        _ => trimmed.to_string(),
    };
    match Version::parse(&padded) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Unparseable version {:?}: {}", version, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: &str, name: &str) -> ModuleInfo {
        let mut m = ModuleInfo::new(id);
        m.name = name.to_string();
        m
    }

    fn registry_with(entries: Vec<ModuleInfo>) -> ModuleRegistry {
        let mut registry = ModuleRegistry::new("plugins");
        let map: HashMap<String, ModuleInfo> =
            entries.into_iter().map(|m| (m.id.clone(), m)).collect();
        registry.set_modules(map);
        registry
    }

    #[test]
    fn test_set_modules_sanitizes() {
        let registry = registry_with(vec![module("My Plugin", "")]);
        let m = registry.module("My Plugin").unwrap();
        assert_eq!(m.sid, "my-plugin");
        assert_eq!(m.name, "My Plugin");
        assert_eq!(m.sname, "my-plugin");
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let modules = vec![
            module("beta", "Same"),
            module("alpha", "Same"),
            module("gamma", "Another"),
        ];
        let once = ModuleRegistry::sort_modules(&modules, "name", true);
        let twice = ModuleRegistry::sort_modules(&once, "name", true);
        assert_eq!(once, twice);
        // Ties on "Same" keep their input order
        assert_eq!(once[0].id, "gamma");
        assert_eq!(once[1].id, "beta");
        assert_eq!(once[2].id, "alpha");
    }

    #[test]
    fn test_descending_sort_keeps_tie_order() {
        let modules = vec![
            module("alpha", "Same"),
            module("beta", "Same"),
            module("gamma", "Same"),
        ];
        let sorted = ModuleRegistry::sort_modules(&modules, "name", false);
        let ids: Vec<&str> = sorted.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_sort_missing_field_falls_back_to_field_name() {
        let sorted = ModuleRegistry::sort_modules(
            &[module("a", "A"), module("b", "B")],
            "no-such-field",
            true,
        );
        // Every key is the same fallback string so input order is kept
        assert_eq!(sorted[0].id, "a");
        assert_eq!(sorted[1].id, "b");
    }

    #[test]
    fn test_sort_never_drops_or_duplicates_ids() {
        let registry = registry_with(vec![
            module("blogroll", "Blogroll"),
            module("tags", "Tags"),
            module("pages", "Pages"),
        ]);
        let sorted = registry.sorted();
        let mut ids: Vec<&str> = sorted.iter().map(|m| m.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["blogroll", "pages", "tags"]);
    }

    #[test]
    fn test_index_buckets_cover_full_alphabet() {
        let mut registry = registry_with(vec![
            module("blogroll", "Blogroll"),
            module("404-page", "404 Page"),
            module("emoji", "\u{1F600} faces"),
        ]);
        registry.set_index(Some(IndexKey::Char('b')));

        let buckets = registry.index_buckets();
        assert_eq!(buckets.len(), 26 + 10 + 1);

        let find = |key: IndexKey| buckets.iter().find(|b| b.key == key).unwrap();
        assert_eq!(find(IndexKey::Char('b')).state, BucketState::Active);
        assert_eq!(find(IndexKey::Char('4')).state, BucketState::Reachable);
        assert_eq!(find(IndexKey::Other).state, BucketState::Reachable);
        assert_eq!(find(IndexKey::Char('z')).state, BucketState::Empty);
    }

    #[test]
    fn test_index_suppressed_during_search_and_when_empty() {
        let mut registry = registry_with(vec![module("blogroll", "Blogroll")]);
        registry.set_search(Some("blog"));
        assert!(registry.index_buckets().is_empty());

        let empty = registry_with(vec![]);
        assert!(empty.index_buckets().is_empty());
    }

    #[test]
    fn test_index_results_filter_by_bucket() {
        let mut registry = registry_with(vec![
            module("blogroll", "Blogroll"),
            module("berry", "Berry"),
            module("tags", "Tags"),
        ]);
        registry.set_index(Some(IndexKey::Char('b')));
        let hits = registry.index_results();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|m| m.sname.starts_with('b')));
    }

    #[test]
    fn test_search_requires_two_characters() {
        let mut registry = registry_with(vec![module("blogroll", "Blogroll")]);
        registry.set_search(Some(" a "));
        assert_eq!(registry.search_query(), None);
        registry.set_search(Some("bl"));
        assert_eq!(registry.search_query(), Some("bl"));
    }

    #[test]
    fn test_search_matches_all_terms() {
        let mut widget = module("fancy-widgets", "Fancy Widgets");
        widget.author = "Jane".to_string();
        widget.tags = vec!["sidebar".to_string()];
        let mut registry = registry_with(vec![widget, module("tags", "Tags")]);

        registry.set_search(Some("widgets sidebar"));
        let hits = registry.search_results();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "fancy-widgets");

        registry.set_search(Some("widgets missing-term"));
        assert!(registry.search_results().is_empty());
    }

    #[test]
    fn test_merge_feed_and_updatable() {
        let mut outdated = module("blogroll", "Blogroll");
        outdated.version = "2.0".to_string();
        let mut fresh = module("tags", "Tags");
        fresh.version = "1.5".to_string();
        let mut registry = registry_with(vec![outdated, fresh]);

        let mut feed = HashMap::new();
        feed.insert(
            "blogroll".to_string(),
            FeedEntry {
                name: "Blogroll".to_string(),
                version: "2.1".to_string(),
                ..FeedEntry::default()
            },
        );
        feed.insert(
            "tags".to_string(),
            FeedEntry {
                name: "Tags".to_string(),
                version: "1.5".to_string(),
                ..FeedEntry::default()
            },
        );
        registry.merge_feed(&feed);

        let updatable = registry.updatable_modules();
        assert_eq!(updatable.len(), 1);
        assert_eq!(updatable[0].id, "blogroll");
    }

    #[test]
    fn test_version_comparison_is_lenient() {
        assert!(version_newer("2.1", "2.0"));
        assert!(version_newer("2", "1.9.9"));
        assert!(version_newer("v1.1.0", "1.0"));
        assert!(!version_newer("2.0", "2.0"));
        assert!(!version_newer("not-a-version", "1.0"));
        assert!(!version_newer("", "1.0"));
    }
}
