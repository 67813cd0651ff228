use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Word-character pattern that makes an abbreviation fire immediately,
/// without waiting for a trigger character.
pub const DEFAULT_TRIGGER_PATTERN: &str = "[\\w]";

/// Payload kind of a snippet. Closed set: readers must map source type codes
/// onto exactly these values or fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnippetType {
    Unsupported,
    Text,
    RichText,
    AppleScript,
    ShellScript,
    JavaScript,
    Python,
}

/// How typed text is matched against an abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    Adaptive,
    CaseSensitive,
    CaseInsensitive,
}

/// How the expansion is delivered to the focused application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMethod {
    Keyboard,
    Clipboard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub usage_count: u32,
}

impl Metadata {
    pub fn new(title: String) -> Self {
        let now = Utc::now();
        Self {
            title,
            description: String::new(),
            created: now,
            updated: now,
            usage_count: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Abbreviation {
    pub text: Option<String>,
    pub mode: MatchMode,
    pub overwrite: bool,
    pub trigger: Option<String>,
}

impl Default for Abbreviation {
    fn default() -> Self {
        Self {
            text: None,
            mode: MatchMode::Adaptive,
            overwrite: true,
            trigger: Some(DEFAULT_TRIGGER_PATTERN.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hotkey {
    pub modifiers: Vec<String>,
    pub key: Option<String>,
}

/// Trigger side of a snippet. Abbreviation text and hotkey may both be set,
/// meaning the snippet fires on either.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Input {
    pub abbreviation: Abbreviation,
    pub hotkey: Hotkey,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowFilter {
    pub regex: Option<String>,
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub method: OutputMethod,
    pub prompt: bool,
    pub window_filter: WindowFilter,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            method: OutputMethod::Keyboard,
            prompt: false,
            window_filter: WindowFilter::default(),
        }
    }
}

/// One expansion rule. Built once by a reader, held immutably, consumed by a
/// writer. `data` is None only for snippets without a textual payload
/// (rich text, unsupported).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub uuid: String,
    pub meta: Metadata,
    pub kind: SnippetType,
    pub input: Input,
    pub output: Output,
    pub data: Option<String>,
}

impl Snippet {
    pub fn new(uuid: String, title: String, kind: SnippetType) -> Self {
        Self {
            uuid,
            meta: Metadata::new(title),
            kind,
            input: Input::default(),
            output: Output::default(),
            data: None,
        }
    }
}

/// Named collection of snippets; materializes as one target directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub uuid: String,
    pub title: String,
    pub snippets: Vec<Snippet>,
}

impl Group {
    pub fn new(uuid: String, title: String) -> Self {
        Self {
            uuid,
            title,
            snippets: Vec::new(),
        }
    }
}

/// Root of one snippet library. Group order is significant: it is the
/// processing order, and collision suffixes are assigned along it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Index {
    pub groups: Vec<Group>,
}
