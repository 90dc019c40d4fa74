use serde_json::Value;

use crate::display::DisplayMode;
use crate::display::cost::calculate_cost;
use crate::display::extract::{ContentExtractor, ExtractedContent};
use crate::display::interactive::{InteractiveDisplay, KeyAction, REASONING_SECTION};
use crate::display::layout::{Section, columns, metadata_table, panel, separator, usage_table};
use crate::display::style::ColorFormatter;
use crate::display::truncate::ContentTruncator;
use crate::settings::Settings;

const SEPARATOR_WIDTH: usize = 80;
const RAW_DEBUG_CHARS: usize = 2000;
const RAW_ERROR_CHARS: usize = 1000;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Turns raw response JSON into terminal text for the active mode.
#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    settings: Settings,
    colors: ColorFormatter,
    truncator: ContentTruncator,
    interactive: InteractiveDisplay,
}

impl ResponseFormatter {
    /// `mode` overrides the configured default mode.
    pub fn new(settings: Settings, mode: Option<DisplayMode>) -> Self {
        let mode = mode.unwrap_or_else(|| settings.display_mode());
        let colors = ColorFormatter::new(settings.colors.clone(), settings.display.enable_colors);
        let truncator = ContentTruncator::new(
            settings.display.truncate_long_content,
            settings.display.max_content_length,
        );
        let interactive = InteractiveDisplay::new(
            mode,
            settings.keyboard.clone(),
            settings.display.enable_interactive,
        );
        Self {
            settings,
            colors,
            truncator,
            interactive,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.interactive.mode()
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.interactive.set_mode(mode);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn colors(&self) -> &ColorFormatter {
        &self.colors
    }

    pub fn shortcuts_enabled(&self) -> bool {
        self.interactive.enabled()
    }

    pub fn handle_key(&mut self, key: &str) -> Option<KeyAction> {
        self.interactive.handle_key(key)
    }

    pub fn render(&mut self, raw: &Value) -> String {
        self.render_with_mode(raw, self.mode())
    }

    pub fn render_with_mode(&mut self, raw: &Value, mode: DisplayMode) -> String {
        let content = ContentExtractor::extract(raw);
        if let Some(error) = &content.error {
            return self.extraction_error(error, raw, mode);
        }
        match mode {
            DisplayMode::Clean => self.clean(&content),
            DisplayMode::Verbose => self.verbose(&content),
            DisplayMode::Debug => self.debug(&content, raw),
        }
    }

    fn clean(&self, content: &ExtractedContent) -> String {
        let Some(text) = &content.text else {
            return self.colors.warning("No response content available.");
        };

        let mut lines = vec![format!(
            "{}{}",
            self.colors.header("Assistant: "),
            self.colors.content(&self.truncator.truncate_content(text, None))
        )];
        if self.settings.display.show_model_info {
            if let Some(model) = &content.model {
                lines.push(self.colors.technical(&format!("Model: {model}")));
            }
        }
        if self.settings.display.show_timestamps {
            let stamp = content.timestamp.format(TIMESTAMP_FORMAT);
            lines.push(self.colors.technical(&format!("Time: {stamp}")));
        }
        self.push_hints(&mut lines);
        lines.join("\n")
    }

    fn verbose(&mut self, content: &ExtractedContent) -> String {
        let mut lines = self.mode_banner();

        if let Some(text) = &content.text {
            lines.push(panel(
                &self.colors.header("Assistant Response"),
                &self.colors.content(text),
            ));
        }

        if let Some(reasoning) = &content.reasoning {
            lines.push(String::new());
            lines.push(self.interactive.expandable_section(
                REASONING_SECTION,
                reasoning,
                false,
                &self.colors,
            ));
        }

        if let Some(usage) = &content.usage {
            lines.push(String::new());
            lines.push(panel("Usage Statistics", &self.colors.usage(&usage_table(usage))));
        }

        self.push_cost(&mut lines, content);
        self.push_hints(&mut lines);
        lines.join("\n")
    }

    fn debug(&self, content: &ExtractedContent, raw: &Value) -> String {
        let mut lines = self.mode_banner();

        if let Some(text) = &content.text {
            lines.push(panel(
                &self.colors.header("Assistant Response"),
                &self.colors.content(text),
            ));
        }

        let mut info = Vec::new();
        if let Some(model) = &content.model {
            info.push(format!("Model: {model}"));
        }
        info.push(format!(
            "Timestamp: {}",
            content.timestamp.format(TIMESTAMP_FORMAT)
        ));
        let mut sections = vec![Section::new("Model Info", info.join("\n"))];
        if let Some(usage) = &content.usage {
            sections.push(Section::new("Usage Statistics", usage_table(usage)));
        }
        if !content.metadata.is_empty() {
            sections.push(Section::new("Metadata", metadata_table(&content.metadata)));
        }
        lines.push(String::new());
        lines.push(columns(&sections));

        if let Some(reasoning) = &content.reasoning {
            lines.push(String::new());
            lines.push(panel("Reasoning", &self.colors.reasoning(reasoning)));
        }

        lines.push(String::new());
        match serde_json::to_string_pretty(raw) {
            Ok(mut raw_text) => {
                if raw_text.chars().count() > RAW_DEBUG_CHARS {
                    raw_text = raw_text.chars().take(RAW_DEBUG_CHARS).collect();
                    raw_text.push_str("\n... (truncated)");
                }
                lines.push(panel("Raw Response", &self.colors.technical(&raw_text)));
            }
            Err(err) => return self.formatting_error(&err.to_string(), content),
        }

        self.push_cost(&mut lines, content);
        self.push_hints(&mut lines);
        lines.join("\n")
    }

    fn mode_banner(&self) -> Vec<String> {
        vec![
            format!("Response {}", self.interactive.mode_indicator(&self.colors)),
            self.colors.dim(&separator(SEPARATOR_WIDTH)),
        ]
    }

    fn push_cost(&self, lines: &mut Vec<String>, content: &ExtractedContent) {
        if !self.settings.display.enable_cost_tracking {
            return;
        }
        let Some(model) = &content.model else {
            return;
        };
        let (prompt, completion) = content.token_counts();
        if let Some(cost) = calculate_cost(model, prompt, completion) {
            lines.push(String::new());
            lines.push(self.colors.usage(&format!("Estimated cost: ${cost:.4}")));
        }
    }

    fn push_hints(&self, lines: &mut Vec<String>) {
        let hints = self.interactive.interaction_hints(&self.colors);
        if !hints.is_empty() {
            lines.push(String::new());
            lines.push(hints);
        }
    }

    fn extraction_error(&self, error: &str, raw: &Value, mode: DisplayMode) -> String {
        let mut out = panel(
            &self.colors.error("Error"),
            &self
                .colors
                .error(&format!("Content Extraction Error\n\n{error}")),
        );
        if mode == DisplayMode::Debug {
            let mut raw_text =
                serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
            if raw_text.chars().count() > RAW_ERROR_CHARS {
                raw_text = raw_text.chars().take(RAW_ERROR_CHARS).collect();
                raw_text.push_str("...");
            }
            out.push('\n');
            out.push_str(&panel(
                "Raw Response (Debug)",
                &self.colors.technical(&raw_text),
            ));
        }
        out
    }

    /// Shows whatever reply text exists, followed by the error.
    fn formatting_error(&self, error: &str, content: &ExtractedContent) -> String {
        let message = format!("Formatting Error: {error}");
        match &content.text {
            Some(text) => format!(
                "{}\n{}\n\n{}",
                self.colors.header("Assistant:"),
                self.colors.content(text),
                self.colors.error(&message)
            ),
            None => panel(&self.colors.error("Formatting Error"), &self.colors.error(&message)),
        }
    }

    /// One mailbox function call and its result.
    pub fn render_tool_call(&self, name: &str, args: &Value, result: &Value) -> String {
        match self.mode() {
            DisplayMode::Clean => self.colors.technical(&format!("[tool] {name}")),
            mode => {
                let args_text =
                    serde_json::to_string_pretty(args).unwrap_or_else(|_| args.to_string());
                let mut result_text =
                    serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
                if mode == DisplayMode::Verbose {
                    result_text = self.truncator.truncate_content(&result_text, None);
                } else if result_text.chars().count() > RAW_DEBUG_CHARS {
                    result_text = result_text.chars().take(RAW_DEBUG_CHARS).collect();
                    result_text.push_str("\n... (truncated)");
                }
                let body = format!("Arguments:\n{args_text}\n\nResult:\n{result_text}");
                panel(&format!("Tool: {name}"), &self.colors.technical(&body))
            }
        }
    }

    pub fn render_error(&self, message: &str) -> String {
        self.colors.error(&format!("Error: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::ResponseFormatter;
    use crate::display::DisplayMode;
    use crate::settings::Settings;

    fn plain_settings() -> Settings {
        let mut settings = Settings::default();
        settings.display.enable_colors = false;
        settings
    }

    fn response() -> Value {
        json!({
            "id": "resp_9",
            "object": "response",
            "created_at": 1_700_000_000,
            "status": "completed",
            "model": "o3",
            "output": [
                {"type": "reasoning", "summary": [{"type": "summary_text", "text": "Checked the folder."}]},
                {"type": "message", "content": [{"type": "output_text", "text": "Two new messages."}]}
            ],
            "text": {"format": {"type": "text"}},
            "usage": {"input_tokens": 1000, "output_tokens": 500, "total_tokens": 1500}
        })
    }

    #[test]
    fn clean_mode_shows_reply_and_hints() {
        let mut formatter = ResponseFormatter::new(plain_settings(), None);
        let out = formatter.render(&response());
        assert!(out.starts_with("Assistant: Two new messages."));
        assert!(out.contains("[Press '/v'=verbose | '/d'=debug]"));
        assert!(!out.contains("Usage"));
    }

    #[test]
    fn clean_mode_without_text_warns() {
        let mut formatter = ResponseFormatter::new(plain_settings(), None);
        let out = formatter.render(&json!({"output": [], "text": {"format": {"type": "text"}}}));
        assert_eq!(out, "No response content available.");
    }

    #[test]
    fn clean_mode_truncates_long_text() {
        let mut settings = plain_settings();
        settings.display.max_content_length = 10;
        let mut formatter = ResponseFormatter::new(settings, None);
        let out = formatter.render(&json!({"output_text": "abcdefghijklmnopqrstuvwxyz"}));
        assert!(out.starts_with("Assistant: abcdefghij..."));
    }

    #[test]
    fn clean_mode_optional_model_line() {
        let mut settings = plain_settings();
        settings.display.show_model_info = true;
        let mut formatter = ResponseFormatter::new(settings, None);
        let out = formatter.render(&response());
        assert!(out.contains("\nModel: o3"));
    }

    #[test]
    fn verbose_mode_sections_and_cost() {
        let mut formatter = ResponseFormatter::new(plain_settings(), Some(DisplayMode::Verbose));
        let out = formatter.render(&response());
        assert!(out.starts_with("Response [VERBOSE]"));
        assert!(out.contains("Assistant Response"));
        assert!(out.contains("▶ Reasoning"));
        assert!(out.contains("Usage Statistics"));
        assert!(out.contains("Input Tokens"));
        assert!(out.contains("Estimated cost: $0.0600"));
        assert!(out.contains("'/r'=reasoning"));
    }

    #[test]
    fn reasoning_toggle_expands_on_rerender() {
        let mut formatter = ResponseFormatter::new(plain_settings(), Some(DisplayMode::Verbose));
        formatter.render(&response());
        formatter.handle_key("r");
        let out = formatter.render(&response());
        assert!(out.contains("▼ Reasoning"));
    }

    #[test]
    fn cost_tracking_can_be_disabled() {
        let mut settings = plain_settings();
        settings.display.enable_cost_tracking = false;
        let mut formatter = ResponseFormatter::new(settings, Some(DisplayMode::Verbose));
        assert!(!formatter.render(&response()).contains("Estimated cost"));
    }

    #[test]
    fn debug_mode_includes_metadata_and_raw() {
        let mut formatter = ResponseFormatter::new(plain_settings(), Some(DisplayMode::Debug));
        let out = formatter.render(&response());
        assert!(out.starts_with("Response [DEBUG]"));
        assert!(out.contains("Model Info"));
        assert!(out.contains("Metadata"));
        assert!(out.contains("resp_9"));
        assert!(out.contains("Checked the folder."));
        assert!(out.contains("Raw Response"));
        assert!(out.contains("\"summary_text\""));
    }

    #[test]
    fn debug_mode_truncates_large_raw_payload() {
        let mut formatter = ResponseFormatter::new(plain_settings(), Some(DisplayMode::Debug));
        let out = formatter.render(&json!({"output_text": "ok", "padding": "p".repeat(5000)}));
        assert!(out.contains("... (truncated)"));
        assert!(!out.contains(&"p".repeat(2500)));
    }

    #[test]
    fn extraction_error_panel() {
        let mut formatter = ResponseFormatter::new(plain_settings(), None);
        let out = formatter.render(&Value::Null);
        assert!(out.contains("Content Extraction Error"));
        assert!(out.contains("empty response"));
        assert!(!out.contains("Raw Response (Debug)"));

        let debug = formatter
            .render_with_mode(&json!({"error": {"message": "boom"}}), DisplayMode::Debug);
        assert!(debug.contains("boom"));
        assert!(debug.contains("Raw Response (Debug)"));
    }

    #[test]
    fn tool_call_rendering_depends_on_mode() {
        let mut formatter = ResponseFormatter::new(plain_settings(), None);
        let args = json!({"top": 5});
        let result = json!({"messages": []});
        assert_eq!(
            formatter.render_tool_call("list_messages", &args, &result),
            "[tool] list_messages"
        );

        formatter.set_mode(DisplayMode::Verbose);
        let out = formatter.render_tool_call("list_messages", &args, &result);
        assert!(out.contains("Tool: list_messages"));
        assert!(out.contains("\"top\": 5"));
    }
}
