//! Session management and the tool-calling loop.

use crate::conversation::Conversation;
use crate::model::{Backend, Message, ModelRequest, Role, ToolCall, ToolChoice, ToolSpec};
use crate::tools::{Dispatcher, ToolRegistry, parse_arguments};
use crate::Result;
use serde_json::Value;
use storage::{Event, EventKind, EventStore, SessionId};
use tracing::{debug, info, warn};

/// Model round trips allowed per user turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Returned to the user when a turn hits the iteration ceiling.
pub const ITERATION_LIMIT_MESSAGE: &str =
    "Reached the maximum number of tool iterations; please simplify your request.";

/// Tool results longer than this are cut in logs and session events.
pub const PREVIEW_CHARS: usize = 500;

/// How a user turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The model answered without requesting tools.
    Final(String),
    /// The iteration ceiling was hit. History up to this point is kept.
    IterationLimit { iterations: usize },
}

impl ChatOutcome {
    /// Text to show the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Final(content) => content,
            Self::IterationLimit { .. } => ITERATION_LIMIT_MESSAGE,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Final(_))
    }
}

/// Progress notifications emitted while a turn runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The model asked for tools; `round` counts from 1.
    ToolRound { round: usize, calls: usize },
    /// A tool is about to run.
    ToolCall {
        id: String,
        name: String,
        arguments: Value,
    },
    /// A tool finished. `preview` is truncated to [`PREVIEW_CHARS`].
    ToolResult {
        id: String,
        name: String,
        preview: String,
    },
}

type Observer = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// A conversation session.
pub struct Session<B> {
    pub id: SessionId,
    store: EventStore,
    backend: B,
    dispatcher: Dispatcher,
    conversation: Conversation,
    system: Option<String>,
    max_iterations: usize,
    observer: Option<Observer>,
}

impl<B: Backend> Session<B> {
    /// Create a new session with the given store, backend, and tools.
    pub fn new(store: EventStore, backend: B, tools: ToolRegistry) -> Result<Self> {
        let id = SessionId::new();
        store.append(&Event::new(id, EventKind::SessionStart))?;

        Ok(Self {
            id,
            store,
            backend,
            dispatcher: Dispatcher::new(tools),
            conversation: Conversation::new(),
            system: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            observer: None,
        })
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the iteration ceiling (at least 1).
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Receive [`SessionEvent`]s while turns run.
    pub fn with_observer(mut self, observer: impl Fn(&SessionEvent) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Tool declarations sent to the model.
    pub fn tools(&self) -> &[ToolSpec] {
        self.dispatcher.registry().describe()
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Send a user message and run the loop until the model answers or the
    /// iteration ceiling is reached.
    ///
    /// Only model endpoint failures are errors. Tool failures are fed back
    /// to the model as text, and transcript writes that fail are logged.
    pub async fn chat(&mut self, user_input: &str) -> Result<ChatOutcome> {
        self.conversation.append(Message::user(user_input))?;
        self.record(Event::message(self.id, Role::User, user_input));

        for iteration in 0..self.max_iterations {
            let request = ModelRequest {
                system: self.system.as_deref(),
                messages: self.conversation.snapshot(),
                tools: self.dispatcher.registry().describe(),
                tool_choice: ToolChoice::Auto,
            };
            debug!(
                session = %self.id,
                iteration,
                turns = request.messages.len(),
                "calling model"
            );
            let response = self.backend.call(request).await?;
            let Message {
                content,
                tool_calls,
                ..
            } = response.message;

            if tool_calls.is_empty() {
                self.conversation.append(Message::assistant(&content))?;
                self.record(Event::message(self.id, Role::Assistant, &content));
                return Ok(ChatOutcome::Final(content));
            }

            let round = iteration + 1;
            info!(session = %self.id, round, calls = tool_calls.len(), "tool round");
            self.notify(SessionEvent::ToolRound {
                round,
                calls: tool_calls.len(),
            });

            if !content.is_empty() {
                self.record(Event::message(self.id, Role::Assistant, &content));
            }
            self.conversation
                .append(Message::assistant_with_tool_calls(content, tool_calls.clone()))?;

            for call in &tool_calls {
                self.run_tool_call(call).await?;
            }
        }

        warn!(
            session = %self.id,
            iterations = self.max_iterations,
            "iteration limit reached"
        );
        self.record(Event::new(
            self.id,
            EventKind::IterationLimit {
                iterations: self.max_iterations,
            },
        ));
        Ok(ChatOutcome::IterationLimit {
            iterations: self.max_iterations,
        })
    }

    async fn run_tool_call(&mut self, call: &ToolCall) -> Result<()> {
        self.record(Event::tool_call(
            self.id,
            &call.id,
            &call.name,
            &call.arguments,
        ));
        self.notify(SessionEvent::ToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: parse_arguments(&call.arguments),
        });

        let output = self.dispatcher.dispatch(&call.name, &call.arguments).await;

        let preview = preview(&output, PREVIEW_CHARS);
        debug!(tool = %call.name, id = %call.id, result = %preview, "tool result");
        self.notify(SessionEvent::ToolResult {
            id: call.id.clone(),
            name: call.name.clone(),
            preview,
        });

        self.record(Event::tool_result(
            self.id,
            &call.id,
            &call.name,
            &output,
        ));
        self.conversation
            .append(Message::tool_result(&call.id, output))?;
        Ok(())
    }

    /// Append to the transcript, logging instead of failing the turn.
    fn record(&self, event: Event) {
        if let Err(e) = self.store.append(&event) {
            warn!(
                session = %self.id,
                kind = event.kind.name(),
                error = %e,
                "failed to record event"
            );
        }
    }

    /// Discard the conversation history. The session itself continues.
    pub fn reset(&mut self) -> Result<()> {
        self.conversation.reset();
        self.store.append(&Event::new(self.id, EventKind::Reset))?;
        info!(session = %self.id, "conversation reset");
        Ok(())
    }

    /// End the session.
    pub fn end(self) -> Result<()> {
        self.store
            .append(&Event::new(self.id, EventKind::SessionEnd))?;
        Ok(())
    }

    fn notify(&self, event: SessionEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }
}

/// Cut `text` to `max` characters, marking the cut with `...`.
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
