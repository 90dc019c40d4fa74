use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde_json::Value;

const METADATA_VALUE_CHARS: usize = 50;

/// A titled block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

fn rounded_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Disabled);
    table
}

/// Rounded box with `title` in the header row.
pub fn panel(title: &str, body: &str) -> String {
    let mut table = rounded_table();
    table.set_header(vec![title.to_string()]);
    table.add_row(vec![body.to_string()]);
    table.to_string()
}

/// Sections side by side, one column each.
pub fn columns(sections: &[Section]) -> String {
    match sections {
        [] => String::new(),
        [single] => panel(&single.title, &single.body),
        many => {
            let mut table = rounded_table();
            table.set_header(many.iter().map(|section| section.title.clone()).collect::<Vec<_>>());
            table.add_row(many.iter().map(|section| section.body.clone()).collect::<Vec<_>>());
            table.to_string()
        }
    }
}

pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// `Metric | Value` table over the usage fields, in response order.
pub fn usage_table(usage: &[(String, Value)]) -> String {
    let mut table = rounded_table();
    table.set_header(vec!["Metric", "Value"]);
    for (key, value) in usage {
        table.add_row(vec![title_case(key), scalar_text(value)]);
    }
    table.to_string()
}

/// `Property | Value` table; nulls are skipped and long values shortened.
pub fn metadata_table(metadata: &[(String, Value)]) -> String {
    let mut table = rounded_table();
    table.set_header(vec!["Property", "Value"]);
    for (key, value) in metadata.iter().filter(|(_, value)| !value.is_null()) {
        let mut text = scalar_text(value);
        if text.chars().count() > METADATA_VALUE_CHARS {
            text = text.chars().take(METADATA_VALUE_CHARS - 3).collect::<String>() + "...";
        }
        table.add_row(vec![title_case(key), text]);
    }
    table.to_string()
}

/// `prompt_tokens` -> `Prompt Tokens`.
pub fn title_case(key: &str) -> String {
    key.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Strings without quotes, everything else as compact JSON.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
