//! Builders for test module trees and requests

#![allow(dead_code)]

use atrium_core::types::ModuleInfo;
use atrium_core::RequestContext;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Write a module directory with a manifest under `root`
pub fn write_module(root: &Path, id: &str, yaml: &str) {
    let dir = root.join(id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("module.yaml"), yaml).unwrap();
}

/// Minimal manifest body for an id/version pair
pub fn manifest(id: &str, version: &str) -> String {
    format!("id: {id}\nversion: \"{version}\"\n")
}

/// Write a module and flag it disabled
pub fn write_disabled_module(root: &Path, id: &str, yaml: &str) {
    write_module(root, id, yaml);
    fs::write(root.join(id).join("_disabled"), b"").unwrap();
}

/// In-memory registry entry builder
pub struct ModuleBuilder {
    info: ModuleInfo,
}

impl ModuleBuilder {
    pub fn new(id: &str) -> Self {
        let mut info = ModuleInfo::new(id);
        info.name = id.to_string();
        info.version = "1.0".to_string();
        info.root_writable = true;
        Self { info }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.info.name = name.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.info.version = version.to_string();
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.info.author = author.to_string();
        self
    }

    pub fn root(mut self, root: &Path) -> Self {
        self.info.root = root.to_path_buf();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.info.root_writable = false;
        self
    }

    pub fn distributed(mut self) -> Self {
        self.info.distributed = true;
        self
    }

    pub fn required_by(mut self, dependents: &[&str]) -> Self {
        self.info.cannot_disable = dependents.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn blocked_by(mut self, reasons: &[&str]) -> Self {
        self.info.cannot_enable = reasons.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> ModuleInfo {
        self.info
    }
}

/// Collect builders into the map `set_modules` expects
pub fn module_map(modules: Vec<ModuleInfo>) -> HashMap<String, ModuleInfo> {
    modules.into_iter().map(|m| (m.id.clone(), m)).collect()
}

/// A request submitting one checkbox-style batch command
pub fn batch_request(command: &str, ids: &[&str]) -> RequestContext {
    RequestContext::new("/admin/plugins")
        .with_post_map(command, ids.iter().map(|s| s.to_string()).collect())
}
