//! # Readers
//!
//! A reader ingests a vendor's on-disk snippet library into the canonical
//! [`Index`](crate::model::Index) tree. Readers are abstracted behind the
//! [`SnippetReader`] trait so writers never see a source format, and so tests
//! can drive the pipeline with a canned index.
//!
//! ## Implementations
//!
//! - [`text_expander::TextExpanderReader`]: TextExpander 5 settings
//!   directories (plist index descriptor + per-group plist descriptors)

use crate::error::Result;
use crate::model::Index;
use std::path::Path;

pub mod text_expander;

/// Abstract interface for snippet library ingestion.
///
/// `read` builds a fresh `Index` per invocation; the caller owns it
/// exclusively afterwards.
pub trait SnippetReader {
    fn read(&self, source: &Path) -> Result<Index>;
}
