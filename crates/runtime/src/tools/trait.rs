//! Tool handler trait.

use crate::tools::ToolError;
use serde_json::Value;
use std::future::Future;

/// A parameter declaration: `(name, type)`, where a trailing `?` on the
/// type marks the parameter optional.
pub type ParamDecl = (&'static str, &'static str);

/// Trait for tool handlers.
///
/// This is the boundary between the model loop and side effects. Handlers
/// receive the decoded JSON object and return plain text.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn params(&self) -> &'static [ParamDecl];

    fn execute(&self, args: Value) -> impl Future<Output = Result<String, ToolError>> + Send;
}
