//! Lifecycle hooks
//!
//! Callers register a typed listener instead of string-keyed callables:
//! every action step has an explicit before/after method with contextual
//! data. The default implementation ignores everything.

use atrium_core::types::ModuleInfo;
use atrium_core::RequestContext;

use crate::store::InstallOutcome;

/// Typed listener invoked around every registry action step
pub trait RegistryHooks {
    fn before_activate(&mut self, _id: &str) {}
    fn after_activate(&mut self, _id: &str) {}

    fn before_deactivate(&mut self, _id: &str) {}
    fn after_deactivate(&mut self, _id: &str) {}

    fn before_delete(&mut self, _id: &str) {}
    /// Receives the full metadata: the files are already gone
    fn after_delete(&mut self, _module: &ModuleInfo) {}

    fn before_install(&mut self, _id: &str) {}
    fn after_install(&mut self, _id: &str, _outcome: InstallOutcome) {}

    fn before_update(&mut self, _id: &str) {}
    fn after_update(&mut self, _id: &str, _outcome: InstallOutcome) {}

    fn before_clone(&mut self, _id: &str) {}
    fn after_clone(&mut self, _id: &str, _clone_id: &str) {}

    fn before_select(&mut self, _id: &str) {}
    fn after_select(&mut self, _id: &str) {}

    /// Delegation point for commands the dispatcher does not recognize;
    /// return true when the request was handled
    fn custom_action(&mut self, _ctx: &RequestContext) -> bool {
        false
    }
}

/// Listener that ignores every event
#[derive(Debug, Default)]
pub struct NoopHooks;

impl RegistryHooks for NoopHooks {}
