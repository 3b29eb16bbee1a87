//! The fixed set of local tools.

mod bash;
mod edit;
mod glob;
mod grep;
mod read;
mod write;

use super::{ParamDecl, Tool, ToolError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A built-in tool kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Read,
    Write,
    Edit,
    Glob,
    Grep,
    Bash,
}

impl Builtin {
    /// Every built-in, in the order they are declared to the model.
    pub const ALL: [Builtin; 6] = [
        Self::Read,
        Self::Write,
        Self::Edit,
        Self::Glob,
        Self::Grep,
        Self::Bash,
    ];
}

impl Tool for Builtin {
    fn name(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Edit => "edit",
            Self::Glob => "glob",
            Self::Grep => "grep",
            Self::Bash => "bash",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Read => "Read file with line numbers (file path, not directory)",
            Self::Write => "Write content to file",
            Self::Edit => "Replace old with new in file (old must be unique unless all=true)",
            Self::Glob => "Find files by pattern, sorted by mtime",
            Self::Grep => "Search files for regex pattern",
            Self::Bash => "Run shell command",
        }
    }

    fn params(&self) -> &'static [ParamDecl] {
        match self {
            Self::Read => &[("path", "string"), ("offset", "number?"), ("limit", "number?")],
            Self::Write => &[("path", "string"), ("content", "string")],
            Self::Edit => &[
                ("path", "string"),
                ("old", "string"),
                ("new", "string"),
                ("all", "boolean?"),
            ],
            Self::Glob => &[("pat", "string"), ("path", "string?")],
            Self::Grep => &[("pat", "string"), ("path", "string?")],
            Self::Bash => &[("cmd", "string")],
        }
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        match self {
            Self::Read => read::run(decode(args)?).await,
            Self::Write => write::run(decode(args)?).await,
            Self::Edit => edit::run(decode(args)?).await,
            Self::Glob => glob::run(decode(args)?),
            Self::Grep => grep::run(decode(args)?),
            Self::Bash => bash::run(decode(args)?).await,
        }
    }
}

/// Decode a tool's typed arguments from the JSON object.
fn decode<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

fn default_dir() -> String {
    ".".to_string()
}
