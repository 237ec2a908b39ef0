use std::fs;
use std::path::{Path, PathBuf};

use natfront_core::lang::{keywords, system};

/// Keyword and system-name spellings belong to the `natfront_core::lang` registries.
///
/// Outside them, a keyword is matched through the `KeywordId` its token carries and a system variable through the
/// `SystemId` the lexer resolved. Comparing token text against a registered spelling breaks silently when a word
/// is retagged (a reserved keyword used as a name) or spelled in lowercase.
///
/// Words the registry doesn't know (`SUBSTRING`, `ONCE`, the `V` of a dynamic length) may still be compared by text.
#[test]
fn vocabulary_is_matched_through_the_registries() {
    let root = repo_root();
    let vocabulary = Vocabulary::load();
    let mut offenders: Vec<(PathBuf, usize, &'static str, String)> = Vec::new();

    for dir in [root.join("src"), root.join("crates"), root.join("fuzz")] {
        if dir.exists() {
            scan_dir(&root, &dir, &vocabulary, &mut offenders);
        }
    }

    if !offenders.is_empty() {
        let mut msg = String::from("Vocabulary spelled out in Rust source; go through natfront_core::lang:\n\n");
        for (path, line_no, reason, line) in offenders.into_iter().take(80) {
            msg.push_str(&format!(
                "- {}:{} ({reason}): {}\n",
                path.strip_prefix(&root).unwrap_or(&path).display(),
                line_no,
                line.trim()
            ));
        }
        panic!("{msg}");
    }
}

#[test]
fn detector_flags_registered_words_only() {
    let vocabulary = Vocabulary::load();
    let flagged = [
        r#"if token.symbol_name() == "REPEAT" {"#,
        r#"    "END-IF" => close(),"#,
        r#"name.eq_ignore_ascii_case("move")"#,
        r#"if text == "*OCC" {"#,
    ];
    for line in flagged {
        assert!(vocabulary.offense(line).is_some(), "not flagged: {line}");
    }

    let allowed = [
        r#"token.symbol_name() == "SUBSTRING""#,
        r#"TokenKind::Identifier if token.symbol_name() == "V" => {"#,
        r#"// compare against "REPEAT" by KeywordId"#,
        r#"self.match_keyword(node, KeywordId::Repeat);"#,
    ];
    for line in allowed {
        assert_eq!(vocabulary.offense(line), None, "flagged: {line}");
    }
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

struct Vocabulary {
    keywords: Vec<&'static str>,
    system_names: Vec<&'static str>,
}

impl Vocabulary {
    fn load() -> Self {
        Self {
            keywords: keywords::KEYWORDS.iter().map(|k| k.canonical).collect(),
            system_names: system::SYSTEM_NAMES.iter().map(|s| s.name).collect(),
        }
    }

    /// Why `line` spells out registered vocabulary, if it does.
    fn offense(&self, line: &str) -> Option<&'static str> {
        if line.trim_start().starts_with("//") {
            return None;
        }
        let upper = line.to_ascii_uppercase();
        for word in &self.keywords {
            let compared = [
                format!("== \"{word}\""),
                format!("\"{word}\" =>"),
                format!("EQ_IGNORE_ASCII_CASE(\"{word}\")"),
            ];
            if compared.iter().any(|pattern| upper.contains(pattern.as_str())) {
                return Some("keyword by text");
            }
        }
        for name in &self.system_names {
            if line.contains(&format!("\"*{name}\"")) {
                return Some("system name by text");
            }
        }
        None
    }
}

fn is_allowed_file(root: &Path, path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some("rs") {
        return true;
    }
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");
    rel.starts_with("crates/natfront_core/src/lang/")
        || rel.starts_with("tests/")
        || rel.contains("/tests/")
        || rel.ends_with("/tests.rs")
        || rel.contains("/target/")
}

fn scan_dir(
    root: &Path,
    dir: &Path,
    vocabulary: &Vocabulary,
    offenders: &mut Vec<(PathBuf, usize, &'static str, String)>,
) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(root, &path, vocabulary, offenders);
            continue;
        }
        if is_allowed_file(root, &path) {
            continue;
        }
        let Ok(contents) = fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in contents.lines().enumerate() {
            if let Some(reason) = vocabulary.offense(line) {
                offenders.push((path.clone(), idx + 1, reason, line.to_string()));
            }
        }
    }
}
