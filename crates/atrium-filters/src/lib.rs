//! List navigation machinery for Atrium admin lists
//!
//! This crate handles:
//! - Typed, request-bindable list filters (select, input, page)
//! - Filter sets with parse-once semantics and a show latch
//! - Compilation of filters into backend query parameters
//! - Page-window computation and pager navigation links

pub mod filter;
pub mod pager;
pub mod params;
pub mod set;

pub use filter::{Filter, FilterId, InputFilter, PageFilter, SelectFilter};
pub use pager::{Pager, PagerLink};
pub use params::{FilterValues, ParamBag, ParamRule, ParamValue};
pub use set::FilterSet;
