//! Installed-module discovery and filesystem lifecycle
//!
//! The `ModuleSource` trait is the boundary to whatever holds the
//! installed modules; `DirModuleSource` is the standard implementation
//! scanning a modules root where every module lives in its own directory
//! with a `module.yaml` manifest. A module is disabled by dropping a
//! `_disabled` marker file into its root.

use atrium_core::types::{ModuleInfo, ModuleManifest, ModuleState};
use atrium_core::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-module manifest file name
pub const MANIFEST_FILE: &str = "module.yaml";

/// Marker file flagging a module as disabled
pub const DISABLED_MARKER: &str = "_disabled";

/// Boundary to the installed-module set
pub trait ModuleSource {
    /// Discover installed modules (enabled and disabled)
    fn scan(&self) -> Result<HashMap<String, ModuleInfo>>;

    fn module_exists(&self, id: &str) -> bool;

    fn activate(&mut self, id: &str) -> Result<()>;

    fn deactivate(&mut self, id: &str) -> Result<()>;

    /// Remove the module's backing files. Destructive and irreversible.
    fn delete(&mut self, id: &str) -> Result<()>;

    /// Copy a module side by side; returns the clone's id
    fn clone_module(&mut self, id: &str) -> Result<String>;

    fn disabled_modules(&self) -> Result<Vec<String>>;

    /// Managed root directory
    fn root(&self) -> &Path;

    /// Whether the managed root itself accepts writes
    fn root_writable(&self) -> bool {
        dir_writable(self.root())
    }
}

/// Filesystem-backed module source
pub struct DirModuleSource {
    root: PathBuf,
}

impl DirModuleSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn module_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    fn read_manifest(&self, dir: &Path) -> Result<ModuleManifest> {
        let content = fs::read_to_string(dir.join(MANIFEST_FILE))?;
        Ok(serde_yaml::from_str(&content)?)
    }

    fn require_module(&self, id: &str) -> Result<PathBuf> {
        let dir = self.module_dir(id);
        if dir.join(MANIFEST_FILE).is_file() {
            Ok(dir)
        } else {
            Err(Error::not_found("module", id))
        }
    }
}

impl ModuleSource for DirModuleSource {
    fn scan(&self) -> Result<HashMap<String, ModuleInfo>> {
        let mut modules = HashMap::new();
        let mut requires: HashMap<String, Vec<String>> = HashMap::new();

        if !self.root.is_dir() {
            warn!("Modules root does not exist: {:?}", self.root);
            return Ok(modules);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let dir = entry.path();
            if !dir.is_dir() || !dir.join(MANIFEST_FILE).is_file() {
                continue;
            }

            let manifest = match self.read_manifest(&dir) {
                Ok(m) => m,
                Err(e) => {
                    warn!("Skipping unreadable manifest in {:?}: {}", dir, e);
                    continue;
                }
            };

            let state = if dir.join(DISABLED_MARKER).exists() {
                ModuleState::Disabled
            } else {
                ModuleState::Enabled
            };
            let writable = dir_writable(&dir);

            requires.insert(manifest.id.clone(), manifest.requires.clone());
            let info = manifest.into_info(dir, writable, state);
            modules.insert(info.id.clone(), info);
        }

        resolve_dependencies(&mut modules, &requires);
        debug!("Scanned {} modules from {:?}", modules.len(), self.root);
        Ok(modules)
    }

    fn module_exists(&self, id: &str) -> bool {
        self.module_dir(id).join(MANIFEST_FILE).is_file()
    }

    fn activate(&mut self, id: &str) -> Result<()> {
        let dir = self.require_module(id)?;
        let marker = dir.join(DISABLED_MARKER);
        if marker.exists() {
            fs::remove_file(&marker)?;
        }
        info!("Activated module {}", id);
        Ok(())
    }

    fn deactivate(&mut self, id: &str) -> Result<()> {
        let dir = self.require_module(id)?;
        fs::write(dir.join(DISABLED_MARKER), b"")?;
        info!("Deactivated module {}", id);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let dir = self.require_module(id)?;
        fs::remove_dir_all(&dir)?;
        info!("Deleted module {} ({:?})", id, dir);
        Ok(())
    }

    fn clone_module(&mut self, id: &str) -> Result<String> {
        let dir = self.require_module(id)?;

        // First free "<id>-copy", "<id>-copy2", ... slot
        let mut clone_id = format!("{id}-copy");
        let mut counter = 2;
        while self.module_dir(&clone_id).exists() {
            clone_id = format!("{id}-copy{counter}");
            counter += 1;
        }

        let clone_dir = self.module_dir(&clone_id);
        copy_dir(&dir, &clone_dir)?;

        // The clone must carry its own id
        let mut manifest = self.read_manifest(&clone_dir)?;
        manifest.id = clone_id.clone();
        fs::write(
            clone_dir.join(MANIFEST_FILE),
            serde_yaml::to_string(&manifest).map_err(Error::YamlParse)?,
        )?;

        info!("Cloned module {} as {}", id, clone_id);
        Ok(clone_id)
    }

    fn disabled_modules(&self) -> Result<Vec<String>> {
        let modules = self.scan()?;
        let mut disabled: Vec<String> = modules
            .into_iter()
            .filter(|(_, m)| !m.is_enabled())
            .map(|(id, _)| id)
            .collect();
        disabled.sort();
        Ok(disabled)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Fill `cannot_enable`/`cannot_disable` from the declared requirements
fn resolve_dependencies(modules: &mut HashMap<String, ModuleInfo>, requires: &HashMap<String, Vec<String>>) {
    // A module required by an enabled module must not be disabled.
    let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
    for (id, deps) in requires {
        let enabled = modules.get(id).map(|m| m.is_enabled()).unwrap_or(false);
        if !enabled {
            continue;
        }
        for dep in deps {
            dependents.entry(dep.clone()).or_default().push(id.clone());
        }
    }
    for (dep, mut ids) in dependents {
        if let Some(module) = modules.get_mut(&dep) {
            ids.sort();
            module.cannot_disable = ids;
        }
    }

    // A module requiring a missing or disabled module must not be enabled.
    let snapshot: HashMap<String, bool> = modules
        .iter()
        .map(|(id, m)| (id.clone(), m.is_enabled()))
        .collect();
    for (id, deps) in requires {
        let mut blocking = Vec::new();
        for dep in deps {
            match snapshot.get(dep) {
                Some(true) => {}
                Some(false) => blocking.push(format!("requires disabled module {dep}")),
                None => blocking.push(format!("requires missing module {dep}")),
            }
        }
        if let Some(module) = modules.get_mut(id) {
            if !module.is_enabled() {
                module.cannot_enable = blocking;
            }
        }
    }
}

/// Whether a directory accepts writes
pub fn dir_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

/// Recursive directory copy (no symlink traversal)
fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        let ty = entry.file_type()?;
        if ty.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else if ty.is_file() {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_module(root: &Path, id: &str, body: &str) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), body).unwrap();
    }

    #[test]
    fn test_scan_reads_manifests_and_state() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "blogroll", "id: blogroll\nname: Blogroll\nversion: \"2.1\"\n");
        write_module(tmp.path(), "tags", "id: tags\nversion: \"1.0\"\n");
        fs::write(tmp.path().join("tags").join(DISABLED_MARKER), b"").unwrap();
        // A stray file at the root is ignored
        fs::write(tmp.path().join("README"), b"not a module").unwrap();

        let source = DirModuleSource::new(tmp.path());
        let modules = source.scan().unwrap();
        assert_eq!(modules.len(), 2);
        assert!(modules["blogroll"].is_enabled());
        assert!(!modules["tags"].is_enabled());
        assert_eq!(modules["blogroll"].name, "Blogroll");
    }

    #[test]
    fn test_activate_deactivate_roundtrip() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "pages", "id: pages\nversion: \"1.0\"\n");

        let mut source = DirModuleSource::new(tmp.path());
        source.deactivate("pages").unwrap();
        assert_eq!(source.disabled_modules().unwrap(), vec!["pages"]);

        source.activate("pages").unwrap();
        assert!(source.disabled_modules().unwrap().is_empty());
    }

    #[test]
    fn test_missing_module_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut source = DirModuleSource::new(tmp.path());
        assert!(matches!(
            source.activate("ghost"),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(source.delete("ghost"), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_delete_removes_files() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "pages", "id: pages\nversion: \"1.0\"\n");

        let mut source = DirModuleSource::new(tmp.path());
        source.delete("pages").unwrap();
        assert!(!tmp.path().join("pages").exists());
        assert!(!source.module_exists("pages"));
    }

    #[test]
    fn test_clone_gets_fresh_id() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "ductile", "id: ductile\nname: Ductile\nversion: \"1.0\"\n");

        let mut source = DirModuleSource::new(tmp.path());
        let first = source.clone_module("ductile").unwrap();
        let second = source.clone_module("ductile").unwrap();
        assert_eq!(first, "ductile-copy");
        assert_eq!(second, "ductile-copy2");

        let modules = source.scan().unwrap();
        assert_eq!(modules.len(), 3);
        assert_eq!(modules["ductile-copy"].id, "ductile-copy");
        assert_eq!(modules["ductile-copy"].name, "Ductile");
    }

    #[test]
    fn test_dependency_protection() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "core-widgets", "id: core-widgets\nversion: \"1.0\"\n");
        write_module(
            tmp.path(),
            "fancy-widgets",
            "id: fancy-widgets\nversion: \"1.0\"\nrequires: [core-widgets]\n",
        );
        write_module(
            tmp.path(),
            "broken",
            "id: broken\nversion: \"1.0\"\nrequires: [absent]\n",
        );
        fs::write(tmp.path().join("broken").join(DISABLED_MARKER), b"").unwrap();

        let source = DirModuleSource::new(tmp.path());
        let modules = source.scan().unwrap();

        assert_eq!(modules["core-widgets"].cannot_disable, vec!["fancy-widgets"]);
        assert!(modules["fancy-widgets"].cannot_disable.is_empty());
        assert_eq!(
            modules["broken"].cannot_enable,
            vec!["requires missing module absent"]
        );
    }
}
