//! Conversation state: the ordered log replayed to the model.

use crate::model::{Message, Role};
use crate::{Error, Result};
use std::collections::VecDeque;

/// Append-only conversation log.
///
/// Enforces tool-call correlation: after an assistant turn with N tool
/// calls, exactly N tool turns answering those calls, in order, must follow
/// before any other turn.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Message>,
    pending: VecDeque<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Message) -> Result<()> {
        match turn.role {
            Role::System => {
                return Err(Error::InvalidState(
                    "system instructions are not part of the conversation".into(),
                ));
            }
            Role::Tool => {
                let id = turn.tool_call_id.as_deref().ok_or_else(|| {
                    Error::InvalidState("tool result without a call id".into())
                })?;
                match self.pending.front() {
                    Some(expected) if expected == id => {
                        self.pending.pop_front();
                    }
                    Some(expected) => {
                        return Err(Error::InvalidState(format!(
                            "tool result for {id}, expected {expected}"
                        )));
                    }
                    None => {
                        return Err(Error::InvalidState(format!(
                            "tool result for {id} with no pending call"
                        )));
                    }
                }
            }
            Role::User | Role::Assistant => {
                if let Some(expected) = self.pending.front() {
                    return Err(Error::InvalidState(format!(
                        "{} turn while tool call {expected} is unanswered",
                        turn.role.as_str()
                    )));
                }
                self.pending = turn.tool_calls.iter().map(|c| c.id.clone()).collect();
            }
        }

        self.turns.push(turn);
        Ok(())
    }

    /// All turns in chronological order.
    pub fn snapshot(&self) -> &[Message] {
        &self.turns
    }

    /// Ids of tool calls still waiting for a result.
    pub fn pending_calls(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Discard every turn.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
