//! # Writers
//!
//! A writer serializes a canonical [`Index`](crate::model::Index) into a
//! vendor's on-disk representation. The [`SnippetWriter`] trait is the only
//! contract readers and the API facade know about.
//!
//! ## Implementations
//!
//! - [`auto_key::AutoKeyWriter`]: AutoKey phrase folders — one directory per
//!   group, a hidden JSON metadata sidecar plus a data file per snippet, and
//!   Python wrappers for scripts AutoKey cannot run natively.

use crate::error::Result;
use crate::model::Index;
use std::path::Path;

pub mod auto_key;

/// Outcome counts from one write run, for reporting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    /// Snippets written as phrases or scripts.
    pub written: usize,
    /// Python wrappers synthesized for non-native script types.
    pub wrappers: usize,
    /// Snippets skipped because their type has no target representation.
    pub skipped: usize,
}

/// Abstract interface for snippet library serialization.
///
/// Processing is ordered and single-threaded: groups in index order, snippets
/// in group order. The order is observable through collision suffixes.
pub trait SnippetWriter {
    fn write(&self, target: &Path, index: &Index) -> Result<WriteReport>;
}
