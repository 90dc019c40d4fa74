use serde_json::{Map, Value, json};

/// JSON schema primitive types supported for tool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolParamType {
    Integer,
    Number,
    String,
    Boolean,
    Object,
    Array,
}

impl ToolParamType {
    fn as_str(self) -> &'static str {
        match self {
            ToolParamType::Integer => "integer",
            ToolParamType::Number => "number",
            ToolParamType::String => "string",
            ToolParamType::Boolean => "boolean",
            ToolParamType::Object => "object",
            ToolParamType::Array => "array",
        }
    }
}

/// One function parameter definition.
#[derive(Debug, Clone)]
pub struct ToolParam {
    /// Parameter name.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// JSON schema type.
    pub kind: ToolParamType,
    /// Whether the parameter is required.
    pub required: bool,
    /// Element type when `kind` is an array.
    pub items: Option<ToolParamType>,
    /// Default advertised to the model.
    pub default: Option<Value>,
}

impl ToolParam {
    /// Builds a parameter definition.
    pub fn new(
        name: impl Into<String>,
        kind: ToolParamType,
        required: bool,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            kind,
            required,
            items: None,
            default: None,
        }
    }

    /// Required string parameter.
    pub fn string(name: impl Into<String>, description: &str) -> Self {
        Self::new(name, ToolParamType::String, true, Some(description.to_string()))
    }

    /// Required array-of-strings parameter.
    pub fn string_list(name: impl Into<String>, description: &str) -> Self {
        let mut param = Self::new(name, ToolParamType::Array, true, Some(description.to_string()));
        param.items = Some(ToolParamType::String);
        param
    }

    /// Marks the parameter optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.required = false;
        self
    }

    fn to_schema(&self) -> Value {
        let mut param_def = Map::new();
        param_def.insert(
            "type".to_string(),
            Value::String(self.kind.as_str().to_string()),
        );
        if let Some(description) = &self.description {
            param_def.insert(
                "description".to_string(),
                Value::String(description.clone()),
            );
        }
        if let Some(items) = self.items {
            param_def.insert("items".to_string(), json!({ "type": items.as_str() }));
        }
        if let Some(default) = &self.default {
            param_def.insert("default".to_string(), default.clone());
        }
        Value::Object(param_def)
    }
}

/// Callable tool function definition.
#[derive(Debug, Clone)]
pub struct ToolFunction {
    /// Function name.
    pub name: String,
    /// Function description.
    pub description: String,
    /// Parameter definitions.
    pub params: Vec<ToolParam>,
}

impl ToolFunction {
    /// Creates a function definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Appends one parameter definition.
    pub fn with_param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    fn to_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            properties.insert(param.name.clone(), param.to_schema());
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

/// Tool wrapper serializable to either API's function-calling schema.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// Function declaration.
    pub function: ToolFunction,
}

impl ToolDefinition {
    /// Wraps a function definition as a tool.
    pub fn from_function(function: ToolFunction) -> Self {
        Self { function }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Flat declaration used by the Responses API.
    pub fn to_responses_json(&self) -> Value {
        json!({
            "type": "function",
            "name": self.function.name,
            "description": self.function.description,
            "parameters": self.function.to_schema(),
            "strict": false,
        })
    }

    /// Nested declaration used by chat completions.
    pub fn to_chat_json(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.function.name,
                "description": self.function.description,
                "parameters": self.function.to_schema(),
            }
        })
    }
}

/// Tool call emitted by a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Provider-generated call id.
    pub id: String,
    /// Tool/function name.
    pub name: String,
    /// Arguments payload.
    pub args: Value,
}

impl ToolCall {
    /// Builds a call from a raw `arguments` field, which models send as a JSON string.
    pub fn from_raw(id: impl Into<String>, name: impl Into<String>, arguments: &Value) -> Self {
        let args = match arguments {
            Value::String(raw) if raw.trim().is_empty() => Value::Object(Map::new()),
            Value::String(raw) => serde_json::from_str(raw).unwrap_or(Value::String(raw.clone())),
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    pub fn args_as_string(&self) -> String {
        match &self.args {
            Value::String(value) => value.clone(),
            other => serde_json::to_string(other).unwrap_or_else(|_| "{}".to_string()),
        }
    }

    /// Chat-completions `tool_calls` entry.
    pub fn to_chat_json(&self) -> Value {
        json!({
            "id": self.id,
            "type": "function",
            "function": {
                "name": self.name,
                "arguments": self.args_as_string(),
            }
        })
    }

    /// Responses API `function_call` input item.
    pub fn to_responses_json(&self) -> Value {
        json!({
            "type": "function_call",
            "call_id": self.id,
            "name": self.name,
            "arguments": self.args_as_string(),
        })
    }
}
