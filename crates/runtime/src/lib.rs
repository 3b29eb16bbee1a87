//! Deckhand runtime: the tool-calling conversation loop.
//!
//! The runtime is organized around these concepts:
//!
//! - **Session**: owns the conversation and runs the loop: call the model,
//!   dispatch any requested tools, feed the results back, repeat until the
//!   model answers or the iteration ceiling is hit.
//! - **Backend**: a trait abstracting the model endpoint
//!   ([`OpenAiBackend`] speaks the OpenAI chat completions protocol).
//! - **ToolRegistry** / **Dispatcher**: the fixed table of local tools and
//!   the boundary that turns every tool failure into text.
//!
//! # Example
//!
//! ```no_run
//! use runtime::{OpenAiBackend, Session, ToolRegistry};
//! use storage::EventStore;
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = OpenAiBackend::builder("gpt-4o-mini")
//!     .base_url("http://localhost:8000/v1")
//!     .api_key("sk-...")
//!     .build()?;
//! let store = EventStore::in_memory()?;
//!
//! let mut session = Session::new(store, backend, ToolRegistry::builtin())?
//!     .with_system("You are a helpful assistant.");
//! let outcome = session.chat("list the rust files here").await?;
//! println!("{}", outcome.text());
//! # Ok(())
//! # }
//! ```

pub mod conversation;
mod error;
pub mod model;
pub mod providers;
mod session;
pub mod tools;

pub use conversation::Conversation;
pub use error::{Error, Result};
pub use model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Role, ToolCall, ToolChoice,
    ToolSpec, Usage,
};
pub use providers::{OpenAiBackend, OpenAiBackendBuilder};
pub use session::{
    ChatOutcome, DEFAULT_MAX_ITERATIONS, ITERATION_LIMIT_MESSAGE, PREVIEW_CHARS, Session,
    SessionEvent, preview,
};
pub use tools::{Builtin, Dispatcher, Tool, ToolError, ToolRegistry};
