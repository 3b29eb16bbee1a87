//! Tool dispatch: the boundary where tool failures become conversation text.

use super::{Tool, ToolRegistry};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Prefix of every tool result that reports a failure.
pub const ERROR_MARKER: &str = "Error: ";

/// Validates, decodes and invokes tool calls. Never fails.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: ToolRegistry,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run the named tool with a raw argument payload and return its text.
    ///
    /// Unknown tools, undecodable arguments and handler errors all come back
    /// as text starting with [`ERROR_MARKER`].
    pub async fn dispatch(&self, name: &str, raw_args: &str) -> String {
        let Some(registered) = self.registry.get(name) else {
            warn!(tool = %name, "model requested unknown tool");
            return format!("{ERROR_MARKER}unknown tool {name}");
        };

        let args = parse_arguments(raw_args);
        debug!(tool = %name, %args, "dispatching tool call");

        match registered.tool.execute(args).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = %name, error = %e, "tool failed");
                format!("{ERROR_MARKER}{e}")
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(ToolRegistry::builtin())
    }
}

/// Parse a raw argument payload as a JSON object.
///
/// Anything that is not an object (bad JSON, empty string, an array) is
/// replaced by an empty object so the call can still proceed.
pub fn parse_arguments(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(other) => {
            warn!(payload = %other, "tool arguments are not an object, using none");
            Value::Object(Map::new())
        }
        Err(e) => {
            warn!(error = %e, "malformed tool arguments, using none");
            Value::Object(Map::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_arguments_accepts_objects_only() {
        assert_eq!(parse_arguments(r#"{"cmd":"ls"}"#), json!({"cmd": "ls"}));
        assert_eq!(parse_arguments("{not json"), json!({}));
        assert_eq!(parse_arguments(""), json!({}));
        assert_eq!(parse_arguments("[1,2]"), json!({}));
    }

    #[tokio::test]
    async fn unknown_tool_is_text() {
        let dispatcher = Dispatcher::default();
        let out = dispatcher.dispatch("delete_universe", "{}").await;
        assert_eq!(out, "Error: unknown tool delete_universe");
    }

    #[tokio::test]
    async fn malformed_arguments_reach_handler_as_empty() {
        let dispatcher = Dispatcher::default();
        let out = dispatcher.dispatch("read", "{{{").await;
        assert!(out.starts_with(ERROR_MARKER));
        assert!(out.contains("missing field `path`"), "{out}");
    }

    #[tokio::test]
    async fn handler_error_is_text() {
        let dispatcher = Dispatcher::default();
        let out = dispatcher
            .dispatch("grep", r#"{"pat": "(unclosed", "path": "."}"#)
            .await;
        assert!(out.starts_with("Error: invalid pattern"), "{out}");
    }

    #[tokio::test]
    async fn successful_call_returns_handler_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "remember the milk\n").unwrap();

        let dispatcher = Dispatcher::default();
        let args = json!({ "path": path.display().to_string() }).to_string();
        let out = dispatcher.dispatch("read", &args).await;
        assert_eq!(out, "   1 | remember the milk");
    }
}
