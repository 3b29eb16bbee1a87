use super::default_dir;
use crate::tools::ToolError;
use regex::Regex;
use serde::Deserialize;
use walkdir::WalkDir;

const MAX_RESULTS: usize = 50;

#[derive(Debug, Deserialize)]
pub(super) struct Args {
    pat: String,
    #[serde(default = "default_dir")]
    path: String,
}

pub(super) fn run(args: Args) -> Result<String, ToolError> {
    let re = Regex::new(&args.pat).map_err(|e| ToolError::InvalidPattern(e.to_string()))?;

    let mut results = Vec::new();
    let files = WalkDir::new(&args.path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file());

    'files: for entry in files {
        // Unreadable files are skipped, binary content is searched lossily.
        let Ok(bytes) = std::fs::read(entry.path()) else {
            continue;
        };
        let text = String::from_utf8_lossy(&bytes);
        for (i, line) in text.lines().enumerate() {
            if re.is_match(line) {
                results.push(format!(
                    "{}:{}: {}",
                    entry.path().display(),
                    i + 1,
                    line.trim_end()
                ));
                if results.len() >= MAX_RESULTS {
                    break 'files;
                }
            }
        }
    }

    if results.is_empty() {
        Ok("No matches".to_string())
    } else {
        Ok(results.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pat: &str, path: &std::path::Path) -> Args {
        Args {
            pat: pat.into(),
            path: path.display().to_string(),
        }
    }

    #[test]
    fn reports_path_and_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "one\nneedle here\nthree\n").unwrap();

        let out = run(args("needle", dir.path())).unwrap();
        assert_eq!(out, format!("{}:2: needle here", file.display()));
    }

    #[test]
    fn caps_results() {
        let dir = tempfile::tempdir().unwrap();
        let body = "hit\n".repeat(80);
        std::fs::write(dir.path().join("many.txt"), body).unwrap();

        let out = run(args("hit", dir.path())).unwrap();
        assert_eq!(out.lines().count(), MAX_RESULTS);
    }

    #[test]
    fn no_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "nothing").unwrap();
        assert_eq!(run(args("needle", dir.path())).unwrap(), "No matches");
    }

    #[test]
    fn invalid_regex_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(args("(unclosed", dir.path())).unwrap_err();
        assert!(matches!(err, ToolError::InvalidPattern(_)));
    }
}
