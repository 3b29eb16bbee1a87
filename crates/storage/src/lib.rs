//! SQLite-backed transcript storage for Deckhand sessions.
//!
//! Every session writes an append-only event log: user and assistant
//! messages, each tool call the model requested, each tool result that was
//! fed back, and lifecycle markers. The log is what `deckhand sessions` and
//! `deckhand logs` read back.
//!
//! # Example
//!
//! ```no_run
//! use storage::{Event, EventKind, EventStore, Role, SessionId};
//!
//! let store = EventStore::open("events.db")?;
//!
//! let session_id = SessionId::new();
//! store.append(&Event::new(session_id, EventKind::SessionStart))?;
//! store.append(&Event::message(session_id, Role::User, "list the rust files"))?;
//! store.append(&Event::tool_call(session_id, "call_1", "glob", r#"{"pat":"*.rs"}"#))?;
//!
//! for event in store.load_session(session_id)? {
//!     println!("{}: {:?}", event.timestamp, event.kind);
//! }
//! # Ok::<(), storage::Error>(())
//! ```

mod error;
mod event;
mod store;

pub use error::{Error, Result};
pub use event::{Event, EventKind, Role, SessionId};
pub use store::{EventStore, SessionSummary};
