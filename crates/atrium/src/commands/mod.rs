//! Command implementations

pub mod common;
pub mod module;
pub mod theme;
pub mod version;
