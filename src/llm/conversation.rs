use crate::llm::tools::ToolCall;

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Instructions sent ahead of the dialogue.
    Developer(String),
    User(String),
    /// Model reply; `tool_calls` is non-empty when the model asked for functions.
    Assistant {
        content: String,
        tool_calls: Vec<ToolCall>,
    },
    /// Result of a function call, keyed by the call id.
    ToolOutput { call_id: String, output: String },
}

/// Ordered history resent with every turn.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    items: Vec<Item>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_developer(prompt: Option<&str>) -> Self {
        let mut conversation = Self::new();
        if let Some(prompt) = prompt.map(str::trim).filter(|prompt| !prompt.is_empty()) {
            conversation.items.push(Item::Developer(prompt.to_string()));
        }
        conversation
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.items.push(Item::User(content.into()));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>, tool_calls: Vec<ToolCall>) {
        self.items.push(Item::Assistant {
            content: content.into(),
            tool_calls,
        });
    }

    pub fn push_tool_output(&mut self, call_id: impl Into<String>, output: impl Into<String>) {
        self.items.push(Item::ToolOutput {
            call_id: call_id.into(),
            output: output.into(),
        });
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops everything after the first `len` items.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }
}
