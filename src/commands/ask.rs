use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::commands::chat::build_session;
use crate::commands::options::TurnArgs;
use crate::graph::GraphSettings;
use crate::graph::functions::tool_definitions;
use crate::llm::client::request_body;
use crate::llm::provider::{base_url_from_env, is_api_key_present};
use crate::llm::{Conversation, ToolDefinition};

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    #[command(flatten)]
    pub turn: TurnArgs,
    /// Print the raw response JSON instead of rendering it
    #[arg(long)]
    pub json: bool,
    /// Print the resolved request without sending it
    #[arg(long)]
    pub dry_run: bool,
    /// Also write the response (or dry-run request) JSON to this file
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,
    /// Prompt text; read from stdin when omitted
    pub prompt: Option<String>,
}

fn read_prompt(arg: Option<String>) -> Result<String, String> {
    let prompt = match arg {
        Some(prompt) => prompt,
        None if io::stdin().is_terminal() => String::new(),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("Failed to read prompt from stdin: {err}"))?;
            buffer
        }
    };
    if prompt.trim().is_empty() {
        return Err("No prompt provided. Pass it as an argument or pipe it on stdin.".to_string());
    }
    Ok(prompt)
}

fn save_output(path: &Path, value: &Value) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!("Failed to create output directory '{}': {err}", parent.display())
        })?;
    }
    let raw = serde_json::to_string(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    fs::write(path, raw)
        .map_err(|err| format!("Failed to write output file '{}': {err}", path.display()))
}

/// Tools a live run would offer, given the current environment.
fn offered_tools(enabled: bool) -> Vec<ToolDefinition> {
    if !enabled {
        return Vec::new();
    }
    if !GraphSettings::is_configured() {
        warn!("mailbox functions disabled: set TENANT_ID, CLIENT_ID and CLIENT_SECRET to enable them");
        return Vec::new();
    }
    tool_definitions()
}

pub async fn run(args: AskArgs, quiet: bool) -> Result<(), String> {
    let prompt = read_prompt(args.prompt)?;
    let resolved = args.turn.resolve()?;

    if args.dry_run {
        debug!(
            api = resolved.options.api.as_str(),
            model = %resolved.options.model,
            api_key_present = is_api_key_present(),
            "dry run"
        );
        let mut conversation = Conversation::with_developer(resolved.system.as_deref());
        conversation.push_user(prompt);
        let tools = offered_tools(resolved.tools);
        let body = json!({
            "dry_run": true,
            "api": resolved.options.api.as_str(),
            "model": resolved.options.model,
            "endpoint": format!("{}{}", base_url_from_env(), resolved.options.api.path()),
            "mode": resolved.mode.map(|mode| mode.as_str()),
            "output": if args.json { "json" } else { "text" },
            "timeout_secs": resolved.options.timeout_secs,
            "tools": tools.iter().map(ToolDefinition::name).collect::<Vec<_>>(),
            "request": request_body(&conversation, &tools, &resolved.options),
        });
        if let Some(path) = &args.save {
            save_output(path, &body)?;
        }
        println!("{body}");
        return Ok(());
    }

    let mut session = build_session(&resolved, quiet)?.with_json_output(args.json);
    let mut stdout = io::stdout();
    let turn = session
        .send_turn(&prompt, &mut stdout)
        .await
        .map_err(|err| err.to_string())?;
    if let Some(path) = &args.save {
        save_output(path, &turn.raw)?;
    }
    Ok(())
}
