//! # Textshift Architecture
//!
//! Textshift is a **UI-agnostic snippet conversion library**: it moves a
//! text-expansion library from one vendor's on-disk format into another's,
//! preserving trigger text, hotkeys, output behavior, and script content.
//! The CLI binary is a thin client over it.
//!
//! ## The Three-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, prints the summary, sets up logging    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - convert(): read → Index → write                          │
//! │  - Returns a structured ConvertReport                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Schema Layer (readers/, writers/)                          │
//! │  - SnippetReader: TextExpander 5 plist libraries in         │
//! │  - SnippetWriter: AutoKey phrase folders out                │
//! │  - Neither side ever sees the other's format                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Canonical Model (model.rs)                                 │
//! │  - Index → Group → Snippet, no behavior                     │
//! │  - The sole contract between readers and writers            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: the Index is the Seam
//!
//! Readers build a fresh [`model::Index`] per invocation; writers consume it.
//! The two never call each other, so new source or target formats only need a
//! new trait impl. Processing is single-threaded and ordered: group and
//! snippet order is observable in the output through collision suffixes.
//!
//! ## Module Overview
//!
//! - [`api`]: The conversion facade — entry point for one run
//! - [`model`]: Canonical data types (`Index`, `Group`, `Snippet`)
//! - [`readers`]: Source-format ingestion behind `SnippetReader`
//! - [`writers`]: Target-format serialization behind `SnippetWriter`
//! - [`error`]: Error types

pub mod api;
pub mod error;
pub mod model;
pub mod readers;
pub mod writers;
