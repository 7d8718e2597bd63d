//! Theme catalog
//!
//! Themes are modules with one extra rule: exactly one theme is "current"
//! per site, recorded as a preference write rather than a module state.
//! The current theme leads the ordering and is never eligible for delete
//! or deactivate while selected.

use atrium_core::types::ModuleInfo;
use atrium_core::PreferenceStore;
use std::collections::HashMap;

use crate::registry::ModuleRegistry;

/// Catalog of installed themes for one site
pub struct ThemeRegistry {
    registry: ModuleRegistry,
    current: Option<String>,
}

impl ThemeRegistry {
    pub fn new() -> Self {
        Self {
            registry: ModuleRegistry::new("themes"),
            current: None,
        }
    }

    /// Build from the preference store's current-theme selection
    pub fn with_prefs(prefs: &dyn PreferenceStore) -> Self {
        let mut themes = Self::new();
        themes.current = prefs.current_theme();
        themes
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }

    pub fn set_modules(&mut self, raw: HashMap<String, ModuleInfo>) -> &mut Self {
        self.registry.set_modules(raw);
        self
    }

    /// Record which theme is current; None means no selection yet
    pub fn set_current(&mut self, id: Option<String>) -> &mut Self {
        self.current = id;
        self
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_current(&self, id: &str) -> bool {
        self.current.as_deref() == Some(id)
    }

    /// The collection with the current theme pinned first
    pub fn sorted(&self) -> Vec<ModuleInfo> {
        let mut sorted = self.registry.sorted();
        if let Some(current) = &self.current {
            if let Some(pos) = sorted.iter().position(|m| &m.id == current) {
                let theme = sorted.remove(pos);
                sorted.insert(0, theme);
            }
        }
        sorted
    }

    /// Whether a theme may appear in the delete eligibility set
    ///
    /// The current theme and distributed themes never qualify, whatever
    /// the permission situation.
    pub fn can_delete(&self, module: &ModuleInfo) -> bool {
        !self.is_current(&module.id)
            && !module.distributed
            && module.cannot_disable.is_empty()
            && module.root_writable
    }

    /// Whether a theme may appear in the deactivate eligibility set
    pub fn can_deactivate(&self, module: &ModuleInfo) -> bool {
        !self.is_current(&module.id) && module.is_enabled() && module.cannot_disable.is_empty()
    }

    /// Ids eligible for a bulk delete action
    pub fn deletable(&self) -> Vec<String> {
        self.eligible(|m| self.can_delete(m))
    }

    /// Ids eligible for a bulk deactivate action
    pub fn deactivatable(&self) -> Vec<String> {
        self.eligible(|m| self.can_deactivate(m))
    }

    fn eligible(&self, keep: impl Fn(&ModuleInfo) -> bool) -> Vec<String> {
        self.sorted()
            .into_iter()
            .filter(|m| keep(m))
            .map(|m| m.id)
            .collect()
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
