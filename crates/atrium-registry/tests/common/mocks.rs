//! Mock collaborators recording what they were told

#![allow(dead_code)]

use atrium_core::types::ModuleInfo;
use atrium_core::{Auth, RequestContext};
use atrium_registry::{InstallOutcome, RegistryHooks};

/// Configurable auth double
pub struct MockAuth {
    pub super_admin: bool,
    pub page_permission: bool,
    pub password: String,
}

impl MockAuth {
    pub fn super_admin() -> Self {
        Self {
            super_admin: true,
            page_permission: true,
            password: "hunter2".to_string(),
        }
    }

    pub fn regular_admin() -> Self {
        Self {
            super_admin: false,
            page_permission: true,
            password: "hunter2".to_string(),
        }
    }
}

impl Auth for MockAuth {
    fn is_super_admin(&self) -> bool {
        self.super_admin
    }

    fn check(&self, _permissions: &str, _context: &str) -> bool {
        self.page_permission
    }

    fn verify_password(&self, password: &str) -> bool {
        password == self.password
    }
}

/// Hook listener recording every event in order
#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub events: Vec<String>,
    /// When true, `custom_action` claims unrecognized requests
    pub handles_custom: bool,
}

impl RegistryHooks for RecordingHooks {
    fn before_activate(&mut self, id: &str) {
        self.events.push(format!("before_activate:{id}"));
    }

    fn after_activate(&mut self, id: &str) {
        self.events.push(format!("after_activate:{id}"));
    }

    fn before_deactivate(&mut self, id: &str) {
        self.events.push(format!("before_deactivate:{id}"));
    }

    fn after_deactivate(&mut self, id: &str) {
        self.events.push(format!("after_deactivate:{id}"));
    }

    fn before_delete(&mut self, id: &str) {
        self.events.push(format!("before_delete:{id}"));
    }

    fn after_delete(&mut self, module: &ModuleInfo) {
        self.events.push(format!("after_delete:{}", module.id));
    }

    fn before_install(&mut self, id: &str) {
        self.events.push(format!("before_install:{id}"));
    }

    fn after_install(&mut self, id: &str, outcome: InstallOutcome) {
        self.events.push(format!("after_install:{id}:{outcome:?}"));
    }

    fn before_update(&mut self, id: &str) {
        self.events.push(format!("before_update:{id}"));
    }

    fn after_update(&mut self, id: &str, outcome: InstallOutcome) {
        self.events.push(format!("after_update:{id}:{outcome:?}"));
    }

    fn before_clone(&mut self, id: &str) {
        self.events.push(format!("before_clone:{id}"));
    }

    fn after_clone(&mut self, id: &str, clone_id: &str) {
        self.events.push(format!("after_clone:{id}:{clone_id}"));
    }

    fn before_select(&mut self, id: &str) {
        self.events.push(format!("before_select:{id}"));
    }

    fn after_select(&mut self, id: &str) {
        self.events.push(format!("after_select:{id}"));
    }

    fn custom_action(&mut self, _ctx: &RequestContext) -> bool {
        self.events.push("custom_action".to_string());
        self.handles_custom
    }
}
