//! Type definitions shared across the Atrium workspace

mod feed_types;
mod module_types;

pub use feed_types::{FeedEntry, FeedFile};
pub use module_types::{ModuleInfo, ModuleManifest, ModuleState};
