use serde_json::{Map, Value, json};

use crate::llm::conversation::{Conversation, Item};
use crate::llm::provider::{Turn, TurnOptions};
use crate::llm::tools::{ToolCall, ToolDefinition};

/// Builds a Responses API request body.
pub fn request_body(
    conversation: &Conversation,
    tools: &[ToolDefinition],
    options: &TurnOptions,
) -> Value {
    let mut payload = Map::new();
    payload.insert("model".to_string(), Value::String(options.model.clone()));
    payload.insert("input".to_string(), Value::Array(input_items(conversation)));
    payload.insert("text".to_string(), json!({ "format": { "type": "text" } }));
    if let Some(effort) = options.reasoning_effort {
        payload.insert(
            "reasoning".to_string(),
            json!({ "effort": effort.as_str(), "summary": options.reasoning_summary }),
        );
    }
    if !tools.is_empty() {
        payload.insert(
            "tools".to_string(),
            Value::Array(tools.iter().map(ToolDefinition::to_responses_json).collect()),
        );
    }
    payload.insert("store".to_string(), Value::Bool(options.store));
    Value::Object(payload)
}

fn input_items(conversation: &Conversation) -> Vec<Value> {
    let mut items = Vec::with_capacity(conversation.len());
    for item in conversation.items() {
        match item {
            Item::Developer(text) => items.push(json!({
                "role": "developer",
                "content": [{ "type": "input_text", "text": text }],
            })),
            Item::User(text) => items.push(json!({ "role": "user", "content": text })),
            Item::Assistant {
                content,
                tool_calls,
            } => {
                if !content.is_empty() {
                    items.push(json!({ "role": "assistant", "content": content }));
                }
                items.extend(tool_calls.iter().map(ToolCall::to_responses_json));
            }
            Item::ToolOutput { call_id, output } => items.push(json!({
                "type": "function_call_output",
                "call_id": call_id,
                "output": output,
            })),
        }
    }
    items
}

/// Splits a Responses API body into text, reasoning summary and function calls.
pub fn parse_turn(raw: Value) -> Turn {
    let mut texts = Vec::new();
    let mut summaries = Vec::new();
    let mut tool_calls = Vec::new();

    for item in raw["output"].as_array().into_iter().flatten() {
        match item["type"].as_str() {
            Some("message") => {
                for part in item["content"].as_array().into_iter().flatten() {
                    if part["type"] == "output_text" {
                        if let Some(text) = part["text"].as_str() {
                            texts.push(text.to_string());
                        }
                    }
                }
            }
            Some("reasoning") => {
                for part in item["summary"].as_array().into_iter().flatten() {
                    if let Some(text) = part["text"].as_str().filter(|text| !text.is_empty()) {
                        summaries.push(text.to_string());
                    }
                }
            }
            Some("function_call") => {
                let name = item["name"].as_str().unwrap_or_default();
                if !name.is_empty() {
                    let id = item["call_id"]
                        .as_str()
                        .or_else(|| item["id"].as_str())
                        .unwrap_or_default();
                    tool_calls.push(ToolCall::from_raw(id, name, &item["arguments"]));
                }
            }
            _ => {}
        }
    }

    let text = if texts.is_empty() {
        raw["output_text"].as_str().map(str::to_string)
    } else {
        Some(texts.join("\n"))
    };

    Turn {
        text: text.filter(|text| !text.is_empty()),
        reasoning: (!summaries.is_empty()).then(|| summaries.join("\n\n")),
        tool_calls,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_turn, request_body};
    use crate::llm::conversation::Conversation;
    use crate::llm::provider::{ReasoningEffort, TurnOptions};
    use crate::llm::tools::ToolCall;

    #[test]
    fn request_carries_history_and_reasoning() {
        let mut conversation = Conversation::with_developer(Some("Manage the mailbox."));
        conversation.push_user("Show my last 5 emails");
        let call = ToolCall::from_raw("call_1", "listEmails", &json!("{\"top\":5}"));
        conversation.push_assistant("", vec![call]);
        conversation.push_tool_output("call_1", "{\"emails\":[]}");

        let options = TurnOptions {
            reasoning_effort: Some(ReasoningEffort::Low),
            ..TurnOptions::default()
        };
        let body = request_body(&conversation, &[], &options);

        assert_eq!(body["model"], "o3");
        assert_eq!(body["text"]["format"]["type"], "text");
        assert_eq!(body["reasoning"], json!({"effort": "low", "summary": "auto"}));
        assert_eq!(body["store"], json!(true));
        assert!(body.get("tools").is_none());

        let input = body["input"].as_array().expect("input array");
        assert_eq!(input.len(), 4);
        assert_eq!(input[0]["role"], "developer");
        assert_eq!(input[0]["content"][0]["type"], "input_text");
        assert_eq!(input[1], json!({"role": "user", "content": "Show my last 5 emails"}));
        assert_eq!(input[2]["type"], "function_call");
        assert_eq!(input[2]["arguments"], "{\"top\":5}");
        assert_eq!(input[3]["type"], "function_call_output");
        assert_eq!(input[3]["call_id"], "call_1");
    }

    #[test]
    fn reasoning_is_omitted_without_effort() {
        let options = TurnOptions {
            reasoning_effort: None,
            ..TurnOptions::default()
        };
        let body = request_body(&Conversation::new(), &[], &options);
        assert!(body.get("reasoning").is_none());
    }

    #[test]
    fn parse_collects_text_reasoning_and_calls() {
        let turn = parse_turn(json!({
            "id": "resp_1",
            "model": "o3-2025-04-16",
            "text": {"format": {"type": "text"}},
            "output": [
                {"type": "reasoning", "summary": [{"type": "summary_text", "text": "Thinking about mail."}]},
                {"type": "function_call", "call_id": "call_9", "name": "listEmails", "arguments": "{\"top\":2}"},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "Hello"},
                    {"type": "output_text", "text": "there"}
                ]}
            ]
        }));

        assert_eq!(turn.text.as_deref(), Some("Hello\nthere"));
        assert_eq!(turn.reasoning.as_deref(), Some("Thinking about mail."));
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].id, "call_9");
        assert_eq!(turn.tool_calls[0].args, json!({"top": 2}));
    }

    #[test]
    fn parse_never_uses_text_format_config_as_reply() {
        let turn = parse_turn(json!({
            "text": {"format": {"type": "text"}},
            "output": []
        }));
        assert!(turn.text.is_none());
    }

    #[test]
    fn parse_falls_back_to_output_text() {
        let turn = parse_turn(json!({"output_text": "short answer"}));
        assert_eq!(turn.text.as_deref(), Some("short answer"));
    }
}
