use crate::tools::ToolError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct Args {
    path: String,
    content: String,
}

pub(super) async fn run(args: Args) -> Result<String, ToolError> {
    tokio::fs::write(&args.path, &args.content)
        .await
        .map_err(|e| ToolError::io(&args.path, e))?;
    Ok(format!("Wrote file: {}", args.path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old").unwrap();

        let out = run(Args {
            path: path.display().to_string(),
            content: "new".into(),
        })
        .await
        .unwrap();

        assert!(out.starts_with("Wrote file: "));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn missing_parent_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.txt");
        let err = run(Args {
            path: path.display().to_string(),
            content: "x".into(),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
    }
}
