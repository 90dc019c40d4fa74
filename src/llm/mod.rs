//! OpenAI integration.
//!
//! The same [`Conversation`] can be sent through either the Responses API or
//! the chat-completions API; each wire format lives in its own module and
//! produces a common [`Turn`].

/// Chat-completions request/response mapping.
pub mod chat_completions;
/// HTTP client bound to an API key and base URL.
pub mod client;
/// Provider-neutral conversation history.
pub mod conversation;
/// Shared request options, turn results and errors.
pub mod provider;
/// Responses API request/response mapping.
pub mod responses;
pub(crate) mod runtime;
/// Tool schema and invocation payload helpers.
pub mod tools;

pub use client::LlmClient;
pub use conversation::{Conversation, Item};
pub use provider::{ApiKind, LlmError, ReasoningEffort, TurnOptions, Turn};
pub use tools::{ToolCall, ToolDefinition};
