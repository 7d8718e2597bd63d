//! Module and theme metadata types
//!
//! A module is a named installable unit (plugin or theme). `ModuleInfo` is
//! the in-memory registry entry; `ModuleManifest` is the on-disk
//! `module.yaml` a module directory ships with.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::slugify;

/// Enabled/disabled state of an installed module
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    #[default]
    Enabled,
    Disabled,
}

/// Registry entry for an installed or remotely-available module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleInfo {
    /// Unique id, derived from the module's filesystem root directory name
    pub id: String,

    /// Sort-normalized id (slug), filled by sanitization
    #[serde(default)]
    pub sid: String,

    /// Raw label from the manifest; falls back to id
    #[serde(default)]
    pub label: String,

    /// Localized display name; falls back to label
    #[serde(default)]
    pub name: String,

    /// Sort-normalized name (slug), filled by sanitization
    #[serde(default)]
    pub sname: String,

    /// Installed version
    #[serde(default)]
    pub version: String,

    /// Version advertised by the remote feed, when known
    #[serde(default)]
    pub current_version: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub details_url: String,

    #[serde(default)]
    pub support_url: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Display section (e.g. "widgets", "seo")
    #[serde(default)]
    pub section: String,

    /// Filesystem root of the installed module
    #[serde(default)]
    pub root: PathBuf,

    /// Whether the module's own root directory is writable
    #[serde(default)]
    pub root_writable: bool,

    /// Source repository feed; None means official/distributed channel
    #[serde(default)]
    pub repository_url: Option<String>,

    #[serde(default)]
    pub state: ModuleState,

    /// Reasons blocking activation (e.g. missing dependencies)
    #[serde(default)]
    pub cannot_enable: Vec<String>,

    /// Enabled modules depending on this one; blocks deactivate and delete
    #[serde(default)]
    pub cannot_disable: Vec<String>,

    /// Module ships its own configuration screen
    #[serde(default)]
    pub standalone_config: bool,

    /// Part of the official distribution (never deletable for themes)
    #[serde(default)]
    pub distributed: bool,
}

impl ModuleInfo {
    /// Create a bare entry with only an id; sanitization fills the rest
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sid: String::new(),
            label: String::new(),
            name: String::new(),
            sname: String::new(),
            version: String::new(),
            current_version: String::new(),
            description: String::new(),
            author: String::new(),
            details_url: String::new(),
            support_url: String::new(),
            tags: Vec::new(),
            section: String::new(),
            root: PathBuf::new(),
            root_writable: false,
            repository_url: None,
            state: ModuleState::Enabled,
            cannot_enable: Vec::new(),
            cannot_disable: Vec::new(),
            standalone_config: false,
            distributed: false,
        }
    }

    /// Fill defaulted fields. Idempotent: re-running changes nothing.
    ///
    /// `sid` is the slugified id, `label` falls back to the id, `name`
    /// falls back to the label and `sname` is the slugified lowercase name.
    pub fn sanitize(&mut self) {
        self.sid = slugify(&self.id);
        if self.label.is_empty() {
            self.label = self.id.clone();
        }
        if self.name.is_empty() {
            self.name = self.label.clone();
        }
        self.sname = slugify(&self.name.to_lowercase());
    }

    /// Whether the module is currently enabled
    pub fn is_enabled(&self) -> bool {
        self.state == ModuleState::Enabled
    }

    /// Whether the module comes from a third-party repository
    pub fn is_third_party(&self) -> bool {
        self.repository_url.is_some()
    }

    /// Look up a sortable/searchable field by name
    ///
    /// Unknown field names return None; callers fall back to the field
    /// name itself when sorting (deliberate legacy behavior, not an error).
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "sid" => Some(self.sid.clone()),
            "label" => Some(self.label.clone()),
            "name" => Some(self.name.clone()),
            "sname" => Some(self.sname.clone()),
            "version" => Some(self.version.clone()),
            "current_version" => Some(self.current_version.clone()),
            "description" => Some(self.description.clone()),
            "author" => Some(self.author.clone()),
            "section" => Some(self.section.clone()),
            _ => None,
        }
    }
}

/// On-disk module manifest (`module.yaml` at a module's root)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub id: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub name: String,

    pub version: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub details_url: String,

    #[serde(default)]
    pub support_url: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub section: String,

    #[serde(default)]
    pub repository_url: Option<String>,

    /// Ids of modules this one requires at run time
    #[serde(default)]
    pub requires: Vec<String>,

    #[serde(default)]
    pub standalone_config: bool,

    #[serde(default)]
    pub distributed: bool,
}

impl ModuleManifest {
    /// Build a registry entry from the manifest plus filesystem facts
    pub fn into_info(self, root: PathBuf, root_writable: bool, state: ModuleState) -> ModuleInfo {
        let mut info = ModuleInfo::new(self.id);
        info.label = self.label;
        info.name = self.name;
        info.version = self.version;
        info.description = self.description;
        info.author = self.author;
        info.details_url = self.details_url;
        info.support_url = self.support_url;
        info.tags = self.tags;
        info.section = self.section;
        info.repository_url = self.repository_url;
        info.standalone_config = self.standalone_config;
        info.distributed = self.distributed;
        info.root = root;
        info.root_writable = root_writable;
        info.state = state;
        info.sanitize();
        info
    }
}
