use chrono::{DateTime, Local};
use serde_json::{Map, Value};

const TEXT_KEYS: [&str; 7] = [
    "text",
    "content",
    "message",
    "response",
    "result",
    "answer",
    "completion",
];
const REASONING_KEYS: [&str; 4] = ["reasoning", "explanation", "rationale", "logic"];
const FLAT_USAGE_KEYS: [&str; 5] = [
    "prompt_tokens",
    "completion_tokens",
    "total_tokens",
    "input_tokens",
    "output_tokens",
];
const METADATA_KEYS: [&str; 9] = [
    "id",
    "created",
    "created_at",
    "object",
    "status",
    "system_fingerprint",
    "finish_reason",
    "logprobs",
    "index",
];

/// The parts of a response worth displaying.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub text: Option<String>,
    pub reasoning: Option<String>,
    /// Token counts in the order the response lists them.
    pub usage: Option<Vec<(String, Value)>>,
    pub model: Option<String>,
    pub timestamp: DateTime<Local>,
    pub metadata: Vec<(String, Value)>,
    pub error: Option<String>,
}

impl ExtractedContent {
    /// `(prompt, completion)` token counts under either naming scheme.
    pub fn token_counts(&self) -> (u64, u64) {
        let Some(usage) = &self.usage else {
            return (0, 0);
        };
        let lookup = |keys: [&str; 2]| {
            usage
                .iter()
                .find(|(key, _)| keys.contains(&key.as_str()))
                .and_then(|(_, value)| value.as_u64())
                .unwrap_or(0)
        };
        (
            lookup(["prompt_tokens", "input_tokens"]),
            lookup(["completion_tokens", "output_tokens"]),
        )
    }
}

/// Probes Responses API, chat-completions and looser payload shapes.
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn extract(raw: &Value) -> ExtractedContent {
        let mut content = ExtractedContent {
            text: None,
            reasoning: None,
            usage: None,
            model: None,
            timestamp: Local::now(),
            metadata: Vec::new(),
            error: None,
        };

        if raw.is_null() {
            content.error = Some("Failed to extract content: empty response".to_string());
            return content;
        }

        content.text = find_text(raw);
        let Some(obj) = raw.as_object() else {
            return content;
        };

        content.error = find_error(obj);
        content.reasoning = find_reasoning(obj);
        content.usage = find_usage(obj);
        content.model = ["model", "model_name", "engine"]
            .iter()
            .find_map(|key| non_empty_str(obj.get(*key)));
        if let Some(created) = obj
            .get("created")
            .or_else(|| obj.get("created_at"))
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            content.timestamp = created.with_timezone(&Local);
        }
        content.metadata = find_metadata(obj);
        content
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

fn first_choice(obj: &Map<String, Value>) -> Option<&Value> {
    obj.get("choices")?.as_array()?.first()
}

fn find_text(raw: &Value) -> Option<String> {
    if let Value::String(text) = raw {
        return Some(text.clone());
    }
    let obj = raw.as_object()?;

    if let Some(text) = non_empty_str(obj.get("output_text")) {
        return Some(text);
    }
    if let Some(text) = output_message_text(obj) {
        return Some(text);
    }
    if let Some(choice) = first_choice(obj) {
        if let Some(text) = non_empty_str(choice.pointer("/message/content")) {
            return Some(text);
        }
        if let Some(text) = non_empty_str(choice.get("text")) {
            return Some(text);
        }
    }

    // Only string values count: the Responses API reuses `text` for its format config.
    TEXT_KEYS.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
        Some(Value::Object(inner)) if *key == "message" => non_empty_str(inner.get("content")),
        _ => None,
    })
}

fn output_items<'a>(
    obj: &'a Map<String, Value>,
    kind: &'a str,
) -> impl Iterator<Item = &'a Value> + 'a {
    obj.get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(move |item| item.get("type").and_then(Value::as_str) == Some(kind))
}

fn output_message_text(obj: &Map<String, Value>) -> Option<String> {
    let parts: Vec<&str> = output_items(obj, "message")
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn find_reasoning(obj: &Map<String, Value>) -> Option<String> {
    let summaries: Vec<&str> = output_items(obj, "reasoning")
        .filter_map(|item| item.get("summary").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .filter(|text| !text.trim().is_empty())
        .collect();
    if !summaries.is_empty() {
        return Some(summaries.join("\n\n"));
    }

    REASONING_KEYS
        .iter()
        .find_map(|key| non_empty_str(obj.get(*key)))
        .or_else(|| {
            first_choice(obj)
                .and_then(|choice| non_empty_str(choice.pointer("/message/reasoning_content")))
        })
}

fn find_usage(obj: &Map<String, Value>) -> Option<Vec<(String, Value)>> {
    let mut usage = Vec::new();
    match obj.get("usage") {
        Some(Value::Object(fields)) => flatten_usage("", fields, &mut usage),
        _ => {
            for key in FLAT_USAGE_KEYS {
                if let Some(value) = obj.get(key).filter(|value| value.is_number()) {
                    usage.push((key.to_string(), value.clone()));
                }
            }
        }
    }
    if usage.is_empty() { None } else { Some(usage) }
}

/// `{"output_tokens_details": {"reasoning_tokens": 3}}` becomes
/// `output_tokens_details_reasoning_tokens = 3`.
fn flatten_usage(prefix: &str, fields: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, value) in fields {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}_{key}")
        };
        match value {
            Value::Object(inner) => flatten_usage(&name, inner, out),
            Value::Null => {}
            scalar => out.push((name, scalar.clone())),
        }
    }
}

fn find_metadata(obj: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut metadata: Vec<(String, Value)> = METADATA_KEYS
        .iter()
        .filter_map(|key| {
            obj.get(*key)
                .filter(|value| !value.is_null())
                .map(|value| (key.to_string(), value.clone()))
        })
        .collect();

    if !metadata.iter().any(|(key, _)| key == "finish_reason") {
        if let Some(reason) = first_choice(obj)
            .and_then(|choice| choice.get("finish_reason"))
            .filter(|value| !value.is_null())
        {
            metadata.push(("finish_reason".to_string(), reason.clone()));
        }
    }
    metadata
}

fn find_error(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(details) => Some(
            non_empty_str(details.get("message"))
                .unwrap_or_else(|| Value::Object(details.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}
