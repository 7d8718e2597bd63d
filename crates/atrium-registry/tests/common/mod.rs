//! Common test utilities for atrium-registry
//!
//! Shared infrastructure for the integration suites:
//! - Builders for module directories, manifests and requests
//! - Mock collaborators (auth, hooks) recording what they were told

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod feed;
pub mod mocks;

pub use builders::*;
pub use feed::*;
pub use mocks::*;
