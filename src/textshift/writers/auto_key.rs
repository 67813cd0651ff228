use super::{SnippetWriter, WriteReport};
use crate::error::{Result, TextShiftError};
use crate::model::{Group, Index, MatchMode, OutputMethod, Snippet, SnippetType};
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// AutoKey `modes` markers for the trigger kinds a phrase responds to.
const MODE_ABBREVIATION: u8 = 1;
const MODE_HOTKEY: u8 = 3;

/// AutoKey's clipboard paste send mode. The plain keyboard send mode is
/// intentionally unused; both delivery methods paste.
const SEND_MODE_PASTE: &str = "<ctrl>+v";

/// Label used when a title contains no word characters at all.
const FALLBACK_LABEL: &str = "untitled";

/// Writes a canonical [`Index`] as AutoKey phrase folders: one directory per
/// group, and per supported snippet a hidden `.{label}.json` metadata sidecar
/// plus a `{label}.{ext}` data file. JavaScript and shell snippets also get a
/// `{label}.py` wrapper, since AutoKey only executes Python natively.
#[derive(Debug, Default)]
pub struct AutoKeyWriter;

/// One snippet reshaped into the AutoKey schema, ready to hit the disk.
struct Transposed {
    label: String,
    ext: &'static str,
    meta: PhraseMeta,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhraseMeta {
    #[serde(rename = "type")]
    kind: &'static str,
    description: String,
    modes: Vec<u8>,
    usage_count: u32,
    prompt: bool,
    omit_trigger: bool,
    match_case: bool,
    show_in_tray_menu: bool,
    abbreviation: AbbreviationMeta,
    hotkey: HotkeyMeta,
    filter: FilterMeta,
    send_mode: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AbbreviationMeta {
    abbreviations: Vec<String>,
    backspace: bool,
    ignore_case: bool,
    immediate: bool,
    trigger_inside: bool,
    word_chars: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HotkeyMeta {
    modifiers: Vec<String>,
    hot_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterMeta {
    regex: Option<String>,
    is_recursive: bool,
}

impl SnippetWriter for AutoKeyWriter {
    fn write(&self, target: &Path, index: &Index) -> Result<WriteReport> {
        fs::create_dir_all(target).map_err(|e| unwritable(target, e))?;

        let mut report = WriteReport::default();
        let mut claimed_dirs: HashSet<String> = HashSet::new();

        for group in &index.groups {
            let dir_name = resolve_group_dir(&mut claimed_dirs, &group.title);
            let group_dir = target.join(&dir_name);
            if !group_dir.exists() {
                fs::create_dir(&group_dir).map_err(|e| unwritable(&group_dir, e))?;
            }
            self.write_group(&group_dir, group, &mut report)?;
        }

        Ok(report)
    }
}

impl AutoKeyWriter {
    fn write_group(&self, dir: &Path, group: &Group, report: &mut WriteReport) -> Result<()> {
        let mut claimed_labels: HashSet<String> = HashSet::new();

        for snippet in &group.snippets {
            match snippet.kind {
                SnippetType::Text
                | SnippetType::JavaScript
                | SnippetType::Python
                | SnippetType::ShellScript => {
                    debug!("transposing snippet {} ({:?})", snippet.uuid, snippet.kind);
                    let mut transposed = transpose(snippet);
                    let meta_json = serde_json::to_string(&transposed.meta)?;

                    transposed.label =
                        resolve_label(dir, &mut claimed_labels, &transposed.label, &meta_json);

                    self.write_snippet_meta(dir, &transposed, &meta_json)?;
                    self.write_snippet_data(dir, &transposed)?;
                    report.written += 1;

                    if matches!(
                        snippet.kind,
                        SnippetType::JavaScript | SnippetType::ShellScript
                    ) {
                        self.write_snippet_wrapper(dir, &transposed)?;
                        report.wrappers += 1;
                    }
                }

                // No target representation; a defined no-op, not an error.
                SnippetType::Unsupported | SnippetType::AppleScript | SnippetType::RichText => {
                    debug!("skipping snippet {} ({:?})", snippet.uuid, snippet.kind);
                    report.skipped += 1;
                }
            }
        }

        Ok(())
    }

    fn write_snippet_meta(&self, dir: &Path, transposed: &Transposed, meta_json: &str) -> Result<()> {
        let target = dir.join(sidecar_name(&transposed.label));
        fs::write(&target, meta_json).map_err(|e| unwritable(&target, e))
    }

    fn write_snippet_data(&self, dir: &Path, transposed: &Transposed) -> Result<()> {
        let target = dir.join(format!("{}.{}", transposed.label, transposed.ext));
        fs::write(&target, &transposed.data).map_err(|e| unwritable(&target, e))?;

        // Wrappers invoke script data files directly, so they need the
        // executable bit.
        #[cfg(unix)]
        if transposed.ext != "txt" {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(0o755))
                .map_err(|e| unwritable(&target, e))?;
        }

        Ok(())
    }

    /// AutoKey only runs Python, so other script languages get a Python shim
    /// that runs the original as a subprocess and types its trimmed output.
    fn write_snippet_wrapper(&self, dir: &Path, transposed: &Transposed) -> Result<()> {
        let abs_dir = fs::canonicalize(dir).map_err(|e| unwritable(dir, e))?;
        let wrapped: PathBuf = abs_dir.join(format!("{}.{}", transposed.label, transposed.ext));

        let wrapper = [
            "import subprocess".to_string(),
            format!(
                "out = subprocess.check_output([\"{}\"], universal_newlines=True).strip()",
                wrapped.display()
            ),
            "keyboard.send_keys(out)".to_string(),
        ]
        .join("\n");

        let target = dir.join(format!("{}.py", transposed.label));
        fs::write(&target, wrapper).map_err(|e| unwritable(&target, e))
    }
}

/// Map a canonical snippet onto the AutoKey phrase/script schema.
fn transpose(snippet: &Snippet) -> Transposed {
    let abbreviation = &snippet.input.abbreviation;

    let mut modes = Vec::new();
    if abbreviation.text.is_some() {
        modes.push(MODE_ABBREVIATION);
    }
    if snippet.input.hotkey.key.is_some() {
        modes.push(MODE_HOTKEY);
    }

    let meta = PhraseMeta {
        kind: transpose_kind(snippet.kind),
        description: snippet.meta.title.clone(),
        modes,
        usage_count: snippet.meta.usage_count,
        prompt: snippet.output.prompt,
        omit_trigger: abbreviation.overwrite,
        match_case: abbreviation.mode == MatchMode::Adaptive,
        show_in_tray_menu: false,
        abbreviation: AbbreviationMeta {
            abbreviations: abbreviation.text.iter().cloned().collect(),
            backspace: abbreviation.overwrite,
            ignore_case: abbreviation.mode == MatchMode::CaseInsensitive,
            immediate: abbreviation.trigger.is_some(),
            trigger_inside: abbreviation.trigger.is_some(),
            word_chars: abbreviation.trigger.clone(),
        },
        hotkey: HotkeyMeta {
            modifiers: snippet.input.hotkey.modifiers.clone(),
            hot_key: snippet.input.hotkey.key.clone(),
        },
        filter: FilterMeta {
            regex: snippet.output.window_filter.regex.clone(),
            is_recursive: snippet.output.window_filter.recursive,
        },
        send_mode: transpose_send_mode(snippet.output.method),
    };

    Transposed {
        label: transpose_label(&snippet.meta.title),
        ext: transpose_extension(snippet.kind),
        meta,
        data: snippet.data.clone().unwrap_or_default(),
    }
}

/// Strip everything that is not a word character from the title.
fn transpose_label(title: &str) -> String {
    let non_word = Regex::new(r"\W").expect("label pattern compiles");
    let label = non_word.replace_all(title, "").into_owned();
    if label.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        label
    }
}

fn transpose_extension(kind: SnippetType) -> &'static str {
    match kind {
        SnippetType::Text => "txt",
        SnippetType::JavaScript => "js",
        SnippetType::Python => "py",
        SnippetType::ShellScript => "sh",
        // Callers only transpose supported kinds.
        SnippetType::Unsupported | SnippetType::AppleScript | SnippetType::RichText => "txt",
    }
}

fn transpose_kind(kind: SnippetType) -> &'static str {
    match kind {
        SnippetType::Python => "script",
        _ => "phrase",
    }
}

fn transpose_send_mode(method: OutputMethod) -> &'static str {
    match method {
        OutputMethod::Clipboard | OutputMethod::Keyboard => SEND_MODE_PASTE,
    }
}

fn sidecar_name(label: &str) -> String {
    format!(".{}.json", label)
}

/// Resolve a unique label within one group directory.
///
/// Uniqueness is probed against the metadata sidecars: a candidate is free if
/// no `.{label}.json` exists, or if the existing sidecar is byte-identical to
/// the one about to be written (same snippet from a previous run, so a rerun
/// overwrites in place instead of stacking suffixes). Labels claimed earlier
/// in the current run are never reused, which keeps same-titled snippets on
/// their deterministic `_1`, `_2`, … suffixes in input order.
fn resolve_label(
    dir: &Path,
    claimed: &mut HashSet<String>,
    base: &str,
    meta_json: &str,
) -> String {
    let mut result = base.to_string();
    let mut i = 0;

    loop {
        if !claimed.contains(&result) {
            match fs::read_to_string(dir.join(sidecar_name(&result))) {
                Err(_) => break,
                Ok(existing) if existing == meta_json => break,
                Ok(_) => {}
            }
        }
        i += 1;
        result = format!("{}_{}", base, i);
    }

    claimed.insert(result.clone());
    result
}

/// Resolve a unique directory name for a group title. Same suffix scheme as
/// snippet labels, but only same-run groups collide: directories left over
/// from a previous run are reused as-is.
fn resolve_group_dir(claimed: &mut HashSet<String>, title: &str) -> String {
    let mut result = title.to_string();
    let mut i = 0;

    while claimed.contains(&result) {
        i += 1;
        result = format!("{}_{}", title, i);
    }

    claimed.insert(result.clone());
    result
}

fn unwritable(path: &Path, source: std::io::Error) -> TextShiftError {
    TextShiftError::TargetUnwritable {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn make_snippet(uuid: &str, title: &str, kind: SnippetType, data: &str) -> Snippet {
        let mut s = Snippet::new(uuid.to_string(), title.to_string(), kind);
        s.data = Some(data.to_string());
        s
    }

    fn make_index(title: &str, snippets: Vec<Snippet>) -> Index {
        Index {
            groups: vec![Group {
                uuid: "g-1".to_string(),
                title: title.to_string(),
                snippets,
            }],
        }
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_end_to_end_work_brb() {
        let tmp = tempfile::tempdir().unwrap();
        let mut snippet = make_snippet("s-1", "brb", SnippetType::Text, "Be right back");
        snippet.input.abbreviation.text = Some("brb".to_string());

        let report = AutoKeyWriter
            .write(tmp.path(), &make_index("Work", vec![snippet]))
            .unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.wrappers, 0);
        assert_eq!(report.skipped, 0);

        let work = tmp.path().join("Work");
        assert_eq!(dir_entries(&work), vec![".brb.json", "brb.txt"]);
        assert_eq!(fs::read_to_string(work.join("brb.txt")).unwrap(), "Be right back");

        let meta: Value =
            serde_json::from_str(&fs::read_to_string(work.join(".brb.json")).unwrap()).unwrap();
        assert_eq!(meta["type"], "phrase");
        assert_eq!(meta["description"], "brb");
        assert_eq!(meta["modes"], serde_json::json!([1]));
        assert_eq!(meta["matchCase"], true);
        assert_eq!(meta["omitTrigger"], true);
        assert_eq!(meta["showInTrayMenu"], false);
        assert_eq!(meta["abbreviation"]["abbreviations"], serde_json::json!(["brb"]));
        assert_eq!(meta["abbreviation"]["backspace"], true);
        assert_eq!(meta["abbreviation"]["ignoreCase"], false);
        assert_eq!(meta["abbreviation"]["immediate"], true);
        assert_eq!(meta["abbreviation"]["triggerInside"], true);
        assert_eq!(meta["abbreviation"]["wordChars"], "[\\w]");
        assert_eq!(meta["hotkey"]["hotKey"], Value::Null);
        assert_eq!(meta["filter"]["isRecursive"], false);
        assert_eq!(meta["sendMode"], "<ctrl>+v");
    }

    #[test]
    fn test_label_collisions_suffix_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let snippets = vec![
            make_snippet("s-1", "Foo", SnippetType::Text, "first"),
            make_snippet("s-2", "Foo", SnippetType::Text, "second"),
            make_snippet("s-3", "Foo", SnippetType::Text, "third"),
        ];

        AutoKeyWriter
            .write(tmp.path(), &make_index("Work", snippets))
            .unwrap();

        let work = tmp.path().join("Work");
        assert_eq!(
            dir_entries(&work),
            vec![
                ".Foo.json",
                ".Foo_1.json",
                ".Foo_2.json",
                "Foo.txt",
                "Foo_1.txt",
                "Foo_2.txt"
            ]
        );
        assert_eq!(fs::read_to_string(work.join("Foo.txt")).unwrap(), "first");
        assert_eq!(fs::read_to_string(work.join("Foo_2.txt")).unwrap(), "third");
    }

    #[test]
    fn test_label_strips_non_word_characters() {
        let tmp = tempfile::tempdir().unwrap();
        let snippet = make_snippet("s-1", "Meeting notes (v2)!", SnippetType::Text, "x");

        AutoKeyWriter
            .write(tmp.path(), &make_index("Work", vec![snippet]))
            .unwrap();

        let work = tmp.path().join("Work");
        assert_eq!(dir_entries(&work), vec![".Meetingnotesv2.json", "Meetingnotesv2.txt"]);
    }

    #[test]
    fn test_skipped_types_produce_no_files() {
        let tmp = tempfile::tempdir().unwrap();
        let snippets = vec![
            make_snippet("s-1", "rich", SnippetType::RichText, ""),
            make_snippet("s-2", "mac", SnippetType::AppleScript, "say hi"),
            make_snippet("s-3", "mystery", SnippetType::Unsupported, ""),
        ];

        let report = AutoKeyWriter
            .write(tmp.path(), &make_index("Work", snippets))
            .unwrap();
        assert_eq!(report.written, 0);
        assert_eq!(report.skipped, 3);
        assert!(dir_entries(&tmp.path().join("Work")).is_empty());
    }

    #[test]
    fn test_javascript_gets_python_wrapper() {
        let tmp = tempfile::tempdir().unwrap();
        let snippet = make_snippet("s-1", "Run", SnippetType::JavaScript, "console.log('hi')");

        let report = AutoKeyWriter
            .write(tmp.path(), &make_index("Scripts", vec![snippet]))
            .unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.wrappers, 1);

        let dir = tmp.path().join("Scripts");
        assert_eq!(dir_entries(&dir), vec![".Run.json", "Run.js", "Run.py"]);

        let wrapper = fs::read_to_string(dir.join("Run.py")).unwrap();
        let expected_path = fs::canonicalize(&dir).unwrap().join("Run.js");
        assert!(wrapper.contains("import subprocess"));
        assert!(wrapper.contains(&format!("[\"{}\"]", expected_path.display())));
        assert!(wrapper.contains("keyboard.send_keys(out)"));
        assert!(expected_path.exists());
    }

    #[test]
    fn test_shell_script_gets_wrapper_and_exec_bit() {
        let tmp = tempfile::tempdir().unwrap();
        let snippet = make_snippet("s-1", "backup", SnippetType::ShellScript, "#!/bin/sh\ndate");

        AutoKeyWriter
            .write(tmp.path(), &make_index("Ops", vec![snippet]))
            .unwrap();

        let dir = tmp.path().join("Ops");
        assert_eq!(dir_entries(&dir), vec![".backup.json", "backup.py", "backup.sh"]);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dir.join("backup.sh")).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_python_is_script_without_wrapper() {
        let tmp = tempfile::tempdir().unwrap();
        let snippet = make_snippet("s-1", "greet", SnippetType::Python, "keyboard.send_keys('hi')");

        let report = AutoKeyWriter
            .write(tmp.path(), &make_index("Scripts", vec![snippet]))
            .unwrap();
        assert_eq!(report.wrappers, 0);

        let dir = tmp.path().join("Scripts");
        assert_eq!(dir_entries(&dir), vec![".greet.json", "greet.py"]);

        let meta: Value =
            serde_json::from_str(&fs::read_to_string(dir.join(".greet.json")).unwrap()).unwrap();
        assert_eq!(meta["type"], "script");
    }

    #[test]
    fn test_send_mode_pastes_for_both_methods() {
        let keyboard = make_snippet("s-1", "a", SnippetType::Text, "x");
        let mut clipboard = make_snippet("s-2", "b", SnippetType::Text, "x");
        clipboard.output.method = OutputMethod::Clipboard;

        assert_eq!(transpose(&keyboard).meta.send_mode, "<ctrl>+v");
        assert_eq!(transpose(&clipboard).meta.send_mode, "<ctrl>+v");
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let index = make_index(
            "Work",
            vec![
                make_snippet("s-1", "Foo", SnippetType::Text, "first"),
                make_snippet("s-2", "Foo", SnippetType::Text, "second"),
            ],
        );

        AutoKeyWriter.write(tmp.path(), &index).unwrap();
        let first = dir_entries(&tmp.path().join("Work"));

        AutoKeyWriter.write(tmp.path(), &index).unwrap();
        let second = dir_entries(&tmp.path().join("Work"));

        assert_eq!(first, second);
        assert_eq!(
            fs::read_to_string(tmp.path().join("Work/Foo_1.txt")).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_foreign_sidecar_pushes_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("Work");
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join(".Foo.json"), "{\"type\":\"phrase\",\"other\":true}").unwrap();

        let snippet = make_snippet("s-1", "Foo", SnippetType::Text, "mine");
        AutoKeyWriter
            .write(tmp.path(), &make_index("Work", vec![snippet]))
            .unwrap();

        assert!(work.join(".Foo_1.json").exists());
        assert_eq!(fs::read_to_string(work.join("Foo_1.txt")).unwrap(), "mine");
    }

    #[test]
    fn test_same_titled_groups_get_suffixed_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let index = Index {
            groups: vec![
                Group {
                    uuid: "g-1".to_string(),
                    title: "Same".to_string(),
                    snippets: vec![make_snippet("s-1", "one", SnippetType::Text, "1")],
                },
                Group {
                    uuid: "g-2".to_string(),
                    title: "Same".to_string(),
                    snippets: vec![make_snippet("s-2", "two", SnippetType::Text, "2")],
                },
            ],
        };

        AutoKeyWriter.write(tmp.path(), &index).unwrap();

        assert!(tmp.path().join("Same/one.txt").exists());
        assert!(tmp.path().join("Same_1/two.txt").exists());
    }

    #[test]
    fn test_target_over_existing_file_is_unwritable() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("occupied");
        fs::write(&blocker, "file, not a directory").unwrap();

        let snippet = make_snippet("s-1", "a", SnippetType::Text, "x");
        let err = AutoKeyWriter
            .write(&blocker, &make_index("Work", vec![snippet]))
            .unwrap_err();
        assert!(matches!(err, TextShiftError::TargetUnwritable { .. }));
    }

    #[test]
    fn test_titles_without_word_characters_fall_back() {
        let tmp = tempfile::tempdir().unwrap();
        let snippet = make_snippet("s-1", "!!!", SnippetType::Text, "x");

        AutoKeyWriter
            .write(tmp.path(), &make_index("Work", vec![snippet]))
            .unwrap();

        assert!(tmp.path().join("Work/untitled.txt").exists());
    }
}
