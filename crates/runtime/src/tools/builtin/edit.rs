use crate::tools::ToolError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct Args {
    path: String,
    old: String,
    new: String,
    #[serde(default)]
    all: bool,
}

pub(super) async fn run(args: Args) -> Result<String, ToolError> {
    if args.old.is_empty() {
        return Err(ToolError::InvalidInput("`old` must not be empty".into()));
    }

    let content = tokio::fs::read_to_string(&args.path)
        .await
        .map_err(|e| ToolError::io(&args.path, e))?;

    let Some((updated, count)) = replace(&content, &args.old, &args.new, args.all)? else {
        return Ok("No match found".to_string());
    };

    tokio::fs::write(&args.path, updated)
        .await
        .map_err(|e| ToolError::io(&args.path, e))?;

    Ok(format!("Replaced {count} occurrence(s)"))
}

/// Returns the new content and replacement count, or `None` when `old`
/// does not occur.
fn replace(
    content: &str,
    old: &str,
    new: &str,
    all: bool,
) -> Result<Option<(String, usize)>, ToolError> {
    let count = content.matches(old).count();
    match count {
        0 => Ok(None),
        _ if all => Ok(Some((content.replace(old, new), count))),
        1 => Ok(Some((content.replacen(old, new, 1), 1))),
        n => Err(ToolError::AmbiguousMatch(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_match_is_replaced() {
        let (out, n) = replace("let x = 1;", "1", "2", false).unwrap().unwrap();
        assert_eq!(out, "let x = 2;");
        assert_eq!(n, 1);
    }

    #[test]
    fn multiple_matches_need_all() {
        assert_eq!(
            replace("a a a", "a", "b", false),
            Err(ToolError::AmbiguousMatch(3))
        );
        let (out, n) = replace("a a a", "a", "b", true).unwrap().unwrap();
        assert_eq!(out, "b b b");
        assert_eq!(n, 3);
    }

    #[test]
    fn no_match() {
        assert_eq!(replace("abc", "z", "y", false), Ok(None));
    }

    #[tokio::test]
    async fn edits_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.rs");
        std::fs::write(&path, "fn main() { old(); }").unwrap();

        let out = run(Args {
            path: path.display().to_string(),
            old: "old()".into(),
            new: "new()".into(),
            all: false,
        })
        .await
        .unwrap();

        assert_eq!(out, "Replaced 1 occurrence(s)");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "fn main() { new(); }"
        );
    }

    #[tokio::test]
    async fn empty_old_is_rejected() {
        let err = run(Args {
            path: "whatever".into(),
            old: String::new(),
            new: "x".into(),
            all: true,
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
