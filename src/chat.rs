//! The interactive conversation loop.

use std::io::{self, BufRead, Write};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::display::ResponseFormatter;
use crate::display::interactive::KeyAction;
use crate::display::progress::ProgressDisplay;
use crate::graph::GraphClient;
use crate::graph::functions::tool_definitions;
use crate::llm::{Conversation, LlmClient, LlmError, ToolDefinition, Turn, TurnOptions};
use crate::settings;

/// Function-call rounds allowed before a turn's reply is shown as is.
pub const MAX_TOOL_ROUNDS: usize = 5;

const SAVE_SHORTCUT: &str = "save";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// What a `/<key>` line did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortcut {
    Applied(KeyAction),
    Saved(String),
    SaveFailed(String),
    Unknown(String),
}

pub struct ChatSession {
    llm: LlmClient,
    graph: Option<GraphClient>,
    options: TurnOptions,
    conversation: Conversation,
    formatter: ResponseFormatter,
    tools: Vec<ToolDefinition>,
    progress: ProgressDisplay,
    last_response: Option<Value>,
    json_output: bool,
}

impl ChatSession {
    /// Mailbox functions are offered to the model only when `graph` is set.
    pub fn new(
        llm: LlmClient,
        graph: Option<GraphClient>,
        options: TurnOptions,
        system: Option<&str>,
        formatter: ResponseFormatter,
    ) -> Self {
        let tools = if graph.is_some() {
            tool_definitions()
        } else {
            Vec::new()
        };
        Self {
            llm,
            graph,
            options,
            conversation: Conversation::with_developer(system),
            formatter,
            tools,
            progress: ProgressDisplay::default(),
            last_response: None,
            json_output: false,
        }
    }

    pub fn with_progress(mut self, progress: ProgressDisplay) -> Self {
        self.progress = progress;
        self
    }

    /// Prints final responses as raw JSON and skips function-call panels.
    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn formatter(&self) -> &ResponseFormatter {
        &self.formatter
    }

    pub fn last_response(&self) -> Option<&Value> {
        self.last_response.as_ref()
    }

    /// Sends one user message, runs any requested mailbox functions and
    /// renders the final reply to `out`.
    ///
    /// On failure the conversation is rolled back to before `input`.
    pub async fn send_turn<W: Write>(
        &mut self,
        input: &str,
        out: &mut W,
    ) -> Result<Turn, ChatError> {
        let mark = self.conversation.len();
        self.conversation.push_user(input);

        match self.run_rounds(out).await {
            Ok(turn) => Ok(turn),
            Err(err) => {
                self.conversation.truncate(mark);
                Err(err)
            }
        }
    }

    async fn run_rounds<W: Write>(&mut self, out: &mut W) -> Result<Turn, ChatError> {
        let mut round = 0;
        loop {
            let spinner = self.progress.start("Waiting for response...");
            let result = self
                .llm
                .send(&self.conversation, &self.tools, &self.options)
                .await;
            spinner.finish_and_clear();
            let turn = result?;

            if turn.tool_calls.is_empty() {
                return self.finish(turn, out);
            }
            let Some(graph) = &self.graph else {
                return self.finish(turn, out);
            };
            if round == MAX_TOOL_ROUNDS {
                warn!(rounds = round, "function call limit reached; showing reply as is");
                return self.finish(turn, out);
            }
            round += 1;

            self.conversation.push_assistant(
                turn.text.clone().unwrap_or_default(),
                turn.tool_calls.clone(),
            );
            for call in &turn.tool_calls {
                info!(function = %call.name, round, "running mailbox function");
                let result = graph.call(&call.name, &call.args).await;
                if !self.json_output {
                    writeln!(
                        out,
                        "{}",
                        self.formatter.render_tool_call(&call.name, &call.args, &result)
                    )?;
                }
                self.conversation.push_tool_output(&call.id, result.to_string());
            }
        }
    }

    fn finish<W: Write>(&mut self, turn: Turn, out: &mut W) -> Result<Turn, ChatError> {
        if self.json_output {
            let raw = serde_json::to_string_pretty(&turn.raw)
                .unwrap_or_else(|_| turn.raw.to_string());
            writeln!(out, "{raw}")?;
        } else {
            writeln!(out, "{}", self.formatter.render(&turn.raw))?;
        }
        self.conversation
            .push_assistant(turn.text.clone().unwrap_or_default(), Vec::new());
        self.last_response = Some(turn.raw.clone());
        Ok(turn)
    }

    /// Applies a `/<key>` line and re-renders the last reply when the view changed.
    pub fn handle_shortcut<W: Write>(
        &mut self,
        key: &str,
        out: &mut W,
    ) -> Result<Shortcut, ChatError> {
        let key = key.trim();
        if key == SAVE_SHORTCUT {
            let mode = self.formatter.mode();
            let message = match settings::update_display_mode(mode.as_str()) {
                Ok(path) => format!("Saved {mode} as the default mode in {}", path.display()),
                Err(err) => {
                    let message = err.to_string();
                    writeln!(out, "{}", self.formatter.render_error(&message))?;
                    return Ok(Shortcut::SaveFailed(message));
                }
            };
            writeln!(out, "{}", self.formatter.colors().dim(&message))?;
            return Ok(Shortcut::Saved(message));
        }

        let Some(action) = self.formatter.handle_key(key) else {
            writeln!(
                out,
                "{}",
                self.formatter
                    .colors()
                    .warning(&format!("Unknown shortcut '/{key}'"))
            )?;
            return Ok(Shortcut::Unknown(key.to_string()));
        };
        debug!(?action, "shortcut applied");
        writeln!(out, "{}", self.formatter.colors().dim(&action.notice()))?;

        if !matches!(action, KeyAction::ShortcutsDisabled) {
            if let Some(raw) = self.last_response.clone() {
                writeln!(out, "{}", self.formatter.render(&raw))?;
            }
        }
        Ok(Shortcut::Applied(action))
    }

    /// Reads `You: ` lines until `exit`, `quit` or end of input.
    pub async fn run_repl<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut out: W,
    ) -> Result<(), ChatError> {
        writeln!(out, "Type 'exit' to quit.")?;
        let mut lines = input.lines();
        loop {
            write!(out, "You: ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                break;
            }
            if let Some(key) = line.strip_prefix('/') {
                if self.formatter.shortcuts_enabled() || key.trim() == SAVE_SHORTCUT {
                    self.handle_shortcut(key, &mut out)?;
                    continue;
                }
            }

            match self.send_turn(line, &mut out).await {
                Ok(_) => {}
                Err(ChatError::Llm(err)) => {
                    warn!(error = %err, "turn failed");
                    writeln!(out, "{}", self.formatter.render_error(&err.to_string()))?;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
