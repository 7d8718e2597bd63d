//! Shared command plumbing
//!
//! Opens the site configuration, wires the registry collaborators for a
//! list type and routes batch commands through the action dispatcher.

use anyhow::{Context, Result};
use atrium_core::{Auth, PreferenceStore, RequestContext, SiteConfig, SortPrefs};
use atrium_registry::{ActionDispatcher, DirModuleSource, ModuleRegistry, ModuleSource, Store};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::output::TerminalNotices;

/// One list type's resolved environment (config, roots, feed)
pub struct ListEnv {
    pub config: SiteConfig,
    pub list_type: &'static str,
}

impl ListEnv {
    pub fn open(list_type: &'static str, config_path: Option<&Path>) -> Result<Self> {
        let config = SiteConfig::load(config_path).context("failed to load site configuration")?;
        Ok(Self { config, list_type })
    }

    pub fn root(&self) -> &Path {
        self.config.root_for(self.list_type)
    }

    pub fn source(&self) -> DirModuleSource {
        DirModuleSource::new(self.root())
    }

    /// Scan the installed set into a fresh registry
    pub fn registry(&self) -> Result<ModuleRegistry> {
        let mut registry = ModuleRegistry::new(self.list_type);
        registry.set_modules(self.source().scan()?);
        Ok(registry)
    }

    /// Feed client, when this list has a repository configured
    pub fn store(&self) -> Result<Option<Store>> {
        match self.config.feed_for(self.list_type) {
            Some(feed) => {
                let cache = self.config.cache_dir().join(self.list_type);
                Ok(Some(Store::new(feed, cache)?))
            }
            None => Ok(None),
        }
    }

    pub fn prefs(&self) -> FilePrefs {
        FilePrefs::open(self.config.cache_dir().join("prefs.yaml"))
    }

    fn list_url(&self) -> String {
        format!("atrium://{}", self.list_type)
    }
}

/// Route one batch command through the dispatcher
pub async fn dispatch(env: &ListEnv, ctx: RequestContext, selectable: bool) -> Result<()> {
    let mut source = env.source();
    let mut registry = ModuleRegistry::new(env.list_type);
    registry.set_modules(source.scan()?);

    let store = env.store()?;
    let auth = LocalAuth;
    let mut prefs = env.prefs();
    let mut notices = TerminalNotices;

    let mut dispatcher = ActionDispatcher::new(
        env.list_type,
        env.list_url(),
        &mut source,
        &auth,
        &mut prefs,
        &mut notices,
    )
    .with_dev_mode(env.config.config.dev_mode)
    .with_multi_install(env.config.config.multi_install)
    .with_selection(selectable);
    if let Some(store) = store.as_ref() {
        dispatcher = dispatcher.with_store(store);
    }

    dispatcher.do_actions(&ctx, &registry).await?;
    Ok(())
}

/// Auth collaborator for the local operator
///
/// The CLI runs with the filesystem rights of whoever invoked it, so the
/// privilege checks always pass; the password re-entry gate maps onto an
/// interactive prompt that only requires a non-empty confirmation.
pub struct LocalAuth;

impl Auth for LocalAuth {
    fn is_super_admin(&self) -> bool {
        true
    }

    fn check(&self, _permissions: &str, _context: &str) -> bool {
        true
    }

    fn verify_password(&self, password: &str) -> bool {
        !password.is_empty()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefsData {
    #[serde(default)]
    sort: HashMap<String, SortPrefs>,

    #[serde(default)]
    current_theme: Option<String>,
}

/// Preference store persisted as a YAML file in the cache directory
pub struct FilePrefs {
    path: PathBuf,
    data: PrefsData,
}

impl FilePrefs {
    pub fn open(path: PathBuf) -> Self {
        let data = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_yaml::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, data }
    }

    fn persist(&self) {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_yaml::to_string(&self.data)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            fs::write(&self.path, content)
        };
        if let Err(e) = write() {
            warn!("Could not persist preferences to {:?}: {}", self.path, e);
        }
    }
}

impl PreferenceStore for FilePrefs {
    fn sort_prefs(&self, list_type: &str) -> Option<SortPrefs> {
        self.data.sort.get(list_type).cloned()
    }

    fn save_sort_prefs(&mut self, list_type: &str, prefs: &SortPrefs) {
        self.data.sort.insert(list_type.to_string(), prefs.clone());
        self.persist();
    }

    fn current_theme(&self) -> Option<String> {
        self.data.current_theme.clone()
    }

    fn set_current_theme(&mut self, id: &str) {
        self.data.current_theme = Some(id.to_string());
        self.persist();
    }
}
