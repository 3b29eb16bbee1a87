use super::default_dir;
use crate::tools::ToolError;
use regex::Regex;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
pub(super) struct Args {
    pat: String,
    #[serde(default = "default_dir")]
    path: String,
}

pub(super) fn run(args: Args) -> Result<String, ToolError> {
    let matcher = compile(&args.pat)?;
    let mut matches: Vec<(String, f64)> = WalkDir::new(&args.path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| matcher.is_match(&e.file_name().to_string_lossy()))
        .map(|e| {
            let mtime = e
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .map_or(0.0, seconds_since_epoch);
            (e.path().display().to_string(), mtime)
        })
        .collect();

    if matches.is_empty() {
        return Ok("No matching files".to_string());
    }

    // Newest first.
    matches.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(matches
        .iter()
        .map(|(path, mtime)| format!("{path} | {mtime:.0}"))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn seconds_since_epoch(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Translate a shell-style file name pattern (`*`, `?`, `[...]`, `[!...]`)
/// into an anchored regex.
fn compile(pattern: &str) -> Result<Regex, ToolError> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                for c in chars.by_ref() {
                    if c == ']' && !class.is_empty() && class != "^" {
                        closed = true;
                        break;
                    }
                    if matches!(c, '\\' | '[' | ']' | '&' | '~') {
                        class.push('\\');
                    }
                    class.push(c);
                }
                if !closed {
                    return Err(ToolError::InvalidPattern(format!(
                        "unclosed character class in {pattern}"
                    )));
                }
                re.push('[');
                re.push_str(&class);
                re.push(']');
            }
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }

    re.push('$');
    Regex::new(&re).map_err(|e| ToolError::InvalidPattern(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_translation() {
        let re = compile("*.rs").unwrap();
        assert!(re.is_match("main.rs"));
        assert!(!re.is_match("main.rs.bak"));

        let re = compile("test_?.txt").unwrap();
        assert!(re.is_match("test_1.txt"));
        assert!(!re.is_match("test_10.txt"));

        let re = compile("[!a]*.md").unwrap();
        assert!(re.is_match("README.md"));
        assert!(!re.is_match("about.md"));

        let re = compile("file.(1)").unwrap();
        assert!(re.is_match("file.(1)"));
    }

    #[test]
    fn unclosed_class_is_rejected() {
        assert!(matches!(compile("[abc"), Err(ToolError::InvalidPattern(_))));
    }

    #[test]
    fn finds_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src").join("lib.rs"), "").unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "").unwrap();

        let out = run(Args {
            pat: "*.rs".into(),
            path: dir.path().display().to_string(),
        })
        .unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("lib.rs | "));

        let none = run(Args {
            pat: "*.py".into(),
            path: dir.path().display().to_string(),
        })
        .unwrap();
        assert_eq!(none, "No matching files");
    }

    #[test]
    fn missing_directory_has_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(Args {
            pat: "*".into(),
            path: dir.path().join("gone").display().to_string(),
        })
        .unwrap();
        assert_eq!(out, "No matching files");
    }
}
