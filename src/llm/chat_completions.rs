use serde_json::{Map, Value, json};

use crate::llm::conversation::{Conversation, Item};
use crate::llm::provider::{Turn, TurnOptions};
use crate::llm::tools::{ToolCall, ToolDefinition};

/// Builds a chat-completions request body.
pub fn request_body(
    conversation: &Conversation,
    tools: &[ToolDefinition],
    options: &TurnOptions,
) -> Value {
    let mut payload = Map::new();
    payload.insert("model".to_string(), Value::String(options.model.clone()));
    payload.insert(
        "messages".to_string(),
        Value::Array(conversation.items().iter().map(message_json).collect()),
    );
    if !tools.is_empty() {
        payload.insert(
            "tools".to_string(),
            Value::Array(tools.iter().map(ToolDefinition::to_chat_json).collect()),
        );
    }
    Value::Object(payload)
}

fn message_json(item: &Item) -> Value {
    match item {
        Item::Developer(text) => json!({ "role": "system", "content": text }),
        Item::User(text) => json!({ "role": "user", "content": text }),
        Item::Assistant {
            content,
            tool_calls,
        } => {
            let mut map = Map::new();
            map.insert("role".to_string(), Value::String("assistant".to_string()));
            let content = if content.is_empty() && !tool_calls.is_empty() {
                Value::Null
            } else {
                Value::String(content.clone())
            };
            map.insert("content".to_string(), content);
            if !tool_calls.is_empty() {
                map.insert(
                    "tool_calls".to_string(),
                    Value::Array(tool_calls.iter().map(ToolCall::to_chat_json).collect()),
                );
            }
            Value::Object(map)
        }
        Item::ToolOutput { call_id, output } => json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": output,
        }),
    }
}

pub fn parse_turn(raw: Value) -> Turn {
    let message = &raw["choices"][0]["message"];
    let text = message["content"]
        .as_str()
        .filter(|content| !content.is_empty())
        .map(str::to_string);
    let tool_calls = parse_tool_calls(message);
    Turn {
        text,
        reasoning: None,
        tool_calls,
        raw,
    }
}

fn parse_tool_calls(message: &Value) -> Vec<ToolCall> {
    let mut tool_calls = Vec::new();
    if let Some(calls) = message["tool_calls"].as_array() {
        for call in calls {
            let id = call["id"].as_str().unwrap_or("");
            let name = call["function"]["name"].as_str().unwrap_or("");
            if !name.is_empty() {
                tool_calls.push(ToolCall::from_raw(id, name, &call["function"]["arguments"]));
            }
        }
    }
    tool_calls
}
