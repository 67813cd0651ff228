use super::SnippetReader;
use crate::error::{Result, TextShiftError};
use crate::model::{Group, Index, MatchMode, Snippet, SnippetType};
use chrono::{DateTime, Utc};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// TE5 descriptor filenames embed a v4 UUID and a 10-character suffix.
const UUID_PATTERN: &str =
    "[A-F0-9]{8}-[A-F0-9]{4}-4[A-F0-9]{3}-[89AB][A-F0-9]{3}-[A-F0-9]{12}";

/// Reads a TextExpander 5 settings directory (or a bare index descriptor
/// file) into the canonical [`Index`] tree.
///
/// The settings directory holds one `index_<uuid>_<suffix>.xml` descriptor
/// listing the groups, and one `group_<uuid>_<suffix>.xml` descriptor per
/// group. Sync clients leave stale duplicates behind, so any pattern match
/// with multiple candidates resolves newest-wins by modification time.
#[derive(Debug, Default)]
pub struct TextExpanderReader;

#[derive(Deserialize)]
struct IndexPlist {
    #[serde(rename = "groupsTE5")]
    groups: Vec<GroupRef>,
}

#[derive(Deserialize)]
struct GroupRef {
    #[serde(rename = "uuidString")]
    uuid: String,
    name: String,
}

#[derive(Deserialize)]
struct GroupPlist {
    #[serde(rename = "snippetPlists")]
    snippets: Vec<SnippetRecord>,
}

#[derive(Deserialize)]
struct SnippetRecord {
    #[serde(rename = "uuidString")]
    uuid: String,
    label: String,
    #[serde(rename = "snippetType")]
    snippet_type: u64,
    #[serde(rename = "abbreviationMode")]
    abbreviation_mode: u64,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(rename = "plainText", default)]
    plain_text: Option<String>,
    #[serde(rename = "creationDate", default)]
    creation_date: Option<plist::Date>,
    #[serde(rename = "modificationDate", default)]
    modification_date: Option<plist::Date>,
}

impl SnippetReader for TextExpanderReader {
    fn read(&self, source: &Path) -> Result<Index> {
        let meta = fs::metadata(source)
            .map_err(|_| TextShiftError::SourceNotFound(source.to_path_buf()))?;

        let index_file = if meta.is_dir() {
            self.find_index_file(source)?
        } else {
            source.to_path_buf()
        };

        self.parse_index(&index_file)
    }
}

impl TextExpanderReader {
    fn parse_index(&self, index_file: &Path) -> Result<Index> {
        let settings_dir = index_file.parent().unwrap_or(Path::new("."));
        let index_plist: IndexPlist = plist::from_file(index_file)
            .map_err(|e| TextShiftError::MalformedSource(e.to_string()))?;

        let mut index = Index::default();
        for group_ref in index_plist.groups {
            if group_ref.name.trim().is_empty() {
                return Err(TextShiftError::MalformedSource(format!(
                    "group {} has an empty name",
                    group_ref.uuid
                )));
            }

            let group_file = self
                .find_group_file(settings_dir, &group_ref.uuid)?
                .ok_or_else(|| TextShiftError::GroupNotFound {
                    uuid: group_ref.uuid.clone(),
                    title: group_ref.name.clone(),
                })?;

            debug!(
                "group {:?} ({}) -> {}",
                group_ref.name,
                group_ref.uuid,
                group_file.display()
            );

            let mut group = Group::new(group_ref.uuid, group_ref.name);
            group.snippets = self.parse_group(&group_file)?;
            index.groups.push(group);
        }

        Ok(index)
    }

    fn parse_group(&self, group_file: &Path) -> Result<Vec<Snippet>> {
        let group_plist: GroupPlist = plist::from_file(group_file)
            .map_err(|e| TextShiftError::MalformedSource(e.to_string()))?;

        group_plist
            .snippets
            .into_iter()
            .map(record_to_snippet)
            .collect()
    }

    /// Locate the index descriptor within a settings directory.
    fn find_index_file(&self, settings_dir: &Path) -> Result<PathBuf> {
        let pattern = Regex::new(&format!("(?i)^index_{}_.{{10}}\\.xml$", UUID_PATTERN))
            .expect("index pattern compiles");

        self.newest_match(settings_dir, &pattern)?
            .ok_or_else(|| TextShiftError::SourceNotFound(settings_dir.to_path_buf()))
    }

    /// Locate the descriptor for one group by its identifier.
    fn find_group_file(&self, settings_dir: &Path, group_uuid: &str) -> Result<Option<PathBuf>> {
        let pattern = Regex::new(&format!(
            "(?i)^group_{}_.{{10}}\\.xml$",
            regex::escape(group_uuid)
        ))
        .expect("group pattern compiles");

        self.newest_match(settings_dir, &pattern)
    }

    /// Of all directory entries matching `pattern`, return the most recently
    /// modified one. Same rule for index and group lookup.
    fn newest_match(&self, dir: &Path, pattern: &Regex) -> Result<Option<PathBuf>> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;

        for entry in fs::read_dir(dir).map_err(TextShiftError::Io)? {
            let entry = entry.map_err(TextShiftError::Io)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !pattern.is_match(name) {
                continue;
            }

            let modified = entry.metadata()?.modified()?;
            let is_newer = match &newest {
                Some((best, _)) => modified > *best,
                None => true,
            };
            if is_newer {
                newest = Some((modified, entry.path()));
            }
        }

        Ok(newest.map(|(_, path)| path))
    }
}

fn record_to_snippet(record: SnippetRecord) -> Result<Snippet> {
    let kind = transpose_type(record.snippet_type)?;
    let mut snippet = Snippet::new(record.uuid, record.label, kind);

    snippet.input.abbreviation.text = record.abbreviation.filter(|t| !t.is_empty());
    snippet.input.abbreviation.mode = transpose_mode(record.abbreviation_mode)?;

    if let Some(date) = record.creation_date {
        snippet.meta.created = date_to_utc(date);
    }
    if let Some(date) = record.modification_date {
        snippet.meta.updated = date_to_utc(date);
    }

    snippet.data = record.plain_text;
    Ok(snippet)
}

/// TE5 snippet type codes. Closed table: any other code is an error, never a
/// silent default.
fn transpose_type(code: u64) -> Result<SnippetType> {
    match code {
        0 => Ok(SnippetType::Text),
        1 => Ok(SnippetType::RichText),
        2 => Ok(SnippetType::AppleScript),
        3 => Ok(SnippetType::ShellScript),
        other => Err(TextShiftError::UnknownCode {
            field: "snippetType",
            code: other,
        }),
    }
}

/// TE5 abbreviation matching mode codes.
fn transpose_mode(code: u64) -> Result<MatchMode> {
    match code {
        0 => Ok(MatchMode::CaseSensitive),
        1 => Ok(MatchMode::CaseInsensitive),
        2 => Ok(MatchMode::Adaptive),
        other => Err(TextShiftError::UnknownCode {
            field: "abbreviationMode",
            code: other,
        }),
    }
}

fn date_to_utc(date: plist::Date) -> DateTime<Utc> {
    DateTime::<Utc>::from(SystemTime::from(date))
}
