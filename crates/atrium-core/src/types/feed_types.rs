//! Remote repository feed types (`modules.yaml` served by a repository)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Remote feed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedFile {
    /// Feed format version
    pub version: String,

    /// Available module packages keyed by module id
    pub modules: HashMap<String, FeedEntry>,
}

/// One remotely-available module package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Display name
    pub name: String,

    /// Latest published version
    pub version: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub author: String,

    /// Package archive URL (tar.gz)
    pub file: String,

    /// SHA-256 of the package archive
    #[serde(default)]
    pub checksum: String,

    #[serde(default)]
    pub details_url: String,

    #[serde(default)]
    pub support_url: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub section: String,

    /// Repository this entry came from; filled by the store client
    #[serde(default)]
    pub repository_url: Option<String>,
}
