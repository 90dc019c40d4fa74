use reqwest::StatusCode;
use serde_json::{Map, Value, json};

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

/// How a successful Graph reply is turned into the function result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Body returned unchanged.
    Json,
    /// `value[]` of messages, summarised under `key`.
    Messages { key: &'static str },
    /// `value[]` returned under `key`.
    Collection { key: &'static str },
    /// Whole body returned under `key`.
    Wrapped { key: &'static str },
    /// Reports `{"status": "sent"}` on 202, otherwise the body text as the status.
    Sent,
    /// Reports the new object's id under `id_key`.
    Created {
        id_key: &'static str,
        message: &'static str,
    },
}

/// A planned Graph call. Paths are relative to the API base.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Used in failure messages, e.g. "get emails".
    pub action: &'static str,
    pub outcome: Outcome,
}

impl GraphRequest {
    pub fn new(method: Method, path: impl Into<String>, action: &'static str, outcome: Outcome) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            action,
            outcome,
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn url(&self, api_base: &str) -> String {
        format!("{}/{}", api_base.trim_end_matches('/'), self.path)
    }

    /// Description used by `--dry-run`.
    pub fn to_json(&self, api_base: &str) -> Value {
        let query: Map<String, Value> = self
            .query
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        json!({
            "method": self.method.as_str(),
            "url": self.url(api_base),
            "query": query,
            "body": self.body.clone().unwrap_or(Value::Null),
        })
    }

    /// Maps the HTTP status and body to the value handed back to the model.
    pub fn shape(&self, status: StatusCode, body: &str) -> Value {
        if !status.is_success() {
            return json!({
                "error": format!("Failed to {}: {} - {}", self.action, status.as_u16(), body)
            });
        }

        let parsed = || serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
        match &self.outcome {
            Outcome::Json => parsed(),
            Outcome::Messages { key } => {
                let summaries: Vec<Value> = parsed()["value"]
                    .as_array()
                    .map(|messages| messages.iter().map(summarize_message).collect())
                    .unwrap_or_default();
                json!({ *key: summaries })
            }
            Outcome::Collection { key } => {
                let items = parsed()["value"].as_array().cloned().unwrap_or_default();
                json!({ *key: items })
            }
            Outcome::Wrapped { key } => json!({ *key: parsed() }),
            Outcome::Sent if status == StatusCode::ACCEPTED => json!({ "status": "sent" }),
            Outcome::Sent => json!({ "status": body }),
            Outcome::Created { id_key, message } => {
                let created = parsed();
                json!({ "success": message, *id_key: created["id"].clone() })
            }
        }
    }
}

fn summarize_message(message: &Value) -> Value {
    let preview = message["bodyPreview"].as_str().unwrap_or_default();
    let preview = if preview.chars().count() > PREVIEW_CHARS {
        format!("{}...", preview.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        preview.to_string()
    };
    json!({
        "id": message["id"].clone(),
        "subject": message["subject"].as_str().unwrap_or("No Subject"),
        "from": message["from"]["emailAddress"]["address"].as_str().unwrap_or("Unknown"),
        "receivedDateTime": message["receivedDateTime"].as_str().unwrap_or("Unknown"),
        "bodyPreview": preview,
    })
}
