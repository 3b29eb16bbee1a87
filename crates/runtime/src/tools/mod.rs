//! Built-in tools, their registry, and the dispatcher.

pub mod builtin;
mod dispatch;
pub mod errors;
mod registry;
#[path = "trait.rs"]
mod tool_trait;

pub use builtin::Builtin;
pub use dispatch::{Dispatcher, ERROR_MARKER, parse_arguments};
pub use errors::ToolError;
pub use registry::{ParamSpec, ParamType, RegisteredTool, ToolRegistry};
pub use tool_trait::{ParamDecl, Tool};
