//! Thin facade over the reader/writer traits.
//!
//! A conversion run is `read → write`, with the canonical
//! [`Index`](crate::model::Index) as the only integration point between the
//! two sides. The CLI calls [`convert`]; library users can drive the traits
//! directly.

use crate::error::Result;
use crate::readers::SnippetReader;
use crate::writers::SnippetWriter;
use log::info;
use std::path::Path;

/// Summary of one conversion run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConvertReport {
    pub groups: usize,
    pub snippets: usize,
    pub written: usize,
    pub wrappers: usize,
    pub skipped: usize,
}

/// Read a snippet library from `source` and write it to `target`.
///
/// Fails on the first error; there are no partial-failure semantics.
pub fn convert<R, W>(
    reader: &R,
    writer: &W,
    source: &Path,
    target: &Path,
) -> Result<ConvertReport>
where
    R: SnippetReader,
    W: SnippetWriter,
{
    info!("reading snippet library from {}", source.display());
    let index = reader.read(source)?;

    let groups = index.groups.len();
    let snippets = index.groups.iter().map(|g| g.snippets.len()).sum();
    info!("read {} groups, {} snippets", groups, snippets);

    let write_report = writer.write(target, &index)?;
    info!(
        "wrote {} snippets ({} wrappers), skipped {}",
        write_report.written, write_report.wrappers, write_report.skipped
    );

    Ok(ConvertReport {
        groups,
        snippets,
        written: write_report.written,
        wrappers: write_report.wrappers,
        skipped: write_report.skipped,
    })
}
