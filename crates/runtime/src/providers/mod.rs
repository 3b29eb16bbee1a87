//! Model endpoint adapters.
//!
//! Each adapter implements [`Backend`](crate::Backend) for one wire protocol.

mod openai;

pub use openai::{OpenAiBackend, OpenAiBackendBuilder};
