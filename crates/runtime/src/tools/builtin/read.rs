use crate::tools::ToolError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct Args {
    path: String,
    /// 1-based first line.
    #[serde(default)]
    offset: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

pub(super) async fn run(args: Args) -> Result<String, ToolError> {
    let content = tokio::fs::read_to_string(&args.path)
        .await
        .map_err(|e| ToolError::io(&args.path, e))?;
    Ok(number_lines(&content, args.offset, args.limit))
}

fn number_lines(content: &str, offset: Option<usize>, limit: Option<usize>) -> String {
    let start = offset.map_or(0, |o| o.saturating_sub(1));
    let take = limit.unwrap_or(usize::MAX);

    let numbered: Vec<String> = content
        .lines()
        .enumerate()
        .skip(start)
        .take(take)
        .map(|(i, line)| format!("{:>4} | {}", i + 1, line.trim_end()))
        .collect();

    if numbered.is_empty() {
        "(empty file)".to_string()
    } else {
        numbered.join("\n")
    }
}
