//! Collaborator traits consumed by the registry and filter layers
//!
//! Authentication, per-user preference storage and flash notices live
//! outside this subsystem; the traits here are the seams they plug into.

/// Authentication/authorization collaborator
pub trait Auth {
    /// Whether the current user holds super-admin rights
    fn is_super_admin(&self) -> bool;

    /// Check a named permission set against a context (e.g. a blog id)
    fn check(&self, permissions: &str, context: &str) -> bool;

    /// Re-verify the current user's password (defense-in-depth for
    /// destructive filesystem writes)
    fn verify_password(&self, password: &str) -> bool;
}

/// Persisted sort triple for one list type
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SortPrefs {
    pub sortby: String,
    pub order: String,
    pub page_size: usize,
}

impl Default for SortPrefs {
    fn default() -> Self {
        Self {
            sortby: "sname".to_string(),
            order: "asc".to_string(),
            page_size: 10,
        }
    }
}

/// Per-user preference store
///
/// Keys are list-type names ("plugins", "themes", ...); the store decides
/// how they map onto the current user.
pub trait PreferenceStore {
    fn sort_prefs(&self, list_type: &str) -> Option<SortPrefs>;

    fn save_sort_prefs(&mut self, list_type: &str, prefs: &SortPrefs);

    /// Currently selected theme for the owning site, when any
    fn current_theme(&self) -> Option<String>;

    /// Atomically select the site's current theme
    fn set_current_theme(&mut self, id: &str);
}

/// Flash-notice collaborator surfacing action outcomes to the user
pub trait NoticeSink {
    fn success(&mut self, message: &str);
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Notice sink that remembers everything it was told; test double and
/// default for non-interactive callers
#[derive(Debug, Default)]
pub struct RecordedNotices {
    pub successes: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl NoticeSink for RecordedNotices {
    fn success(&mut self, message: &str) {
        self.successes.push(message.to_string());
    }

    fn warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// In-memory preference store; test double and single-process default
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    sort: std::collections::HashMap<String, SortPrefs>,
    current_theme: Option<String>,
}

impl PreferenceStore for MemoryPrefs {
    fn sort_prefs(&self, list_type: &str) -> Option<SortPrefs> {
        self.sort.get(list_type).cloned()
    }

    fn save_sort_prefs(&mut self, list_type: &str, prefs: &SortPrefs) {
        self.sort.insert(list_type.to_string(), prefs.clone());
    }

    fn current_theme(&self) -> Option<String> {
        self.current_theme.clone()
    }

    fn set_current_theme(&mut self, id: &str) {
        self.current_theme = Some(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_prefs_roundtrip() {
        let mut prefs = MemoryPrefs::default();
        assert!(prefs.sort_prefs("plugins").is_none());

        let triple = SortPrefs {
            sortby: "author".to_string(),
            order: "desc".to_string(),
            page_size: 30,
        };
        prefs.save_sort_prefs("plugins", &triple);
        assert_eq!(prefs.sort_prefs("plugins"), Some(triple));
    }

    #[test]
    fn test_theme_selection_is_single() {
        let mut prefs = MemoryPrefs::default();
        prefs.set_current_theme("ductile");
        prefs.set_current_theme("berlin");
        assert_eq!(prefs.current_theme().as_deref(), Some("berlin"));
    }

    #[test]
    fn test_recorded_notices() {
        let mut notices = RecordedNotices::default();
        notices.success("ok");
        notices.warning("meh");
        assert_eq!(notices.successes.len(), 1);
        assert_eq!(notices.warnings.len(), 1);
        assert!(notices.errors.is_empty());
    }
}
