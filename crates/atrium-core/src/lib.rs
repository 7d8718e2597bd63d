//! # atrium-core
//!
//! Core library for the Atrium admin backend providing:
//! - Site configuration parsing (atrium.yaml)
//! - Type definitions for modules, themes and repository feeds
//! - The request context value object
//! - Collaborator traits (auth, preferences, notices)
//! - Error taxonomy shared across the workspace

pub mod config;
pub mod error;
pub mod request;
pub mod traits;
pub mod types;
pub mod utils;

pub use config::SiteConfig;
pub use error::{Error, Result};
pub use request::{FormValue, RequestContext};
pub use traits::{Auth, MemoryPrefs, NoticeSink, PreferenceStore, RecordedNotices, SortPrefs};
