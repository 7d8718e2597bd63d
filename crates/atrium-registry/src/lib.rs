//! Module and theme lifecycle management
//!
//! This crate holds the admin backend's registry layer:
//! - Installed-module discovery and filesystem lifecycle (`source`)
//! - The remote repository feed client and package handling (`store`)
//! - The in-memory catalog with sort/search/index views (`registry`)
//! - Theme single-selection semantics (`themes`)
//! - Batch action dispatch with permission gates and partial-failure
//!   accumulation (`actions`)
//! - Typed lifecycle hooks (`hooks`)

pub mod actions;
pub mod hooks;
pub mod registry;
pub mod source;
pub mod store;
pub mod themes;

pub use actions::{ActionDispatcher, BatchOutcome, Redirect};
pub use hooks::{NoopHooks, RegistryHooks};
pub use registry::{BucketState, IndexBucket, IndexKey, ModuleRegistry};
pub use source::{DirModuleSource, ModuleSource};
pub use store::{InstallOutcome, Store};
pub use themes::ThemeRegistry;
