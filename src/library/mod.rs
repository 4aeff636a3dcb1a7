//! The remote book library and what is eligible to fish from.
//!
//! # Library Layout (Calibre)
//!
//! ```text
//! <root>/
//! ├── metadata.db                     # books, data, tags, books_tags_link
//! └── <Author>/
//!     └── <Title> (<id>)/
//!         └── <Title> - <Author>.epub
//! ```
//!
//! Without a Calibre database the catalog falls back to a recursive search
//! for `*.epub`, in which case no tags exist and nothing is filtered.

pub mod calibre;
pub mod catalog;
pub mod defaults;
pub mod filter;

pub use catalog::{classify, CatalogEntry, CatalogListing, CatalogMode, CatalogSource};
pub use filter::{evaluate, is_eligible, Eligibility, ExcludeReason, FilterConfig, IncludeReason};
