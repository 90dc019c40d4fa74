use std::io::{self, IsTerminal};
use std::time::Duration;

use clap::Args;
use tracing::{debug, warn};

use crate::chat::ChatSession;
use crate::commands::options::{ResolvedTurn, TurnArgs};
use crate::display::ResponseFormatter;
use crate::display::progress::ProgressDisplay;
use crate::graph::{GraphClient, GraphSettings};
use crate::llm::LlmClient;
use crate::llm::provider::is_api_key_present;
use crate::settings::Settings;

#[derive(Debug, Args, Clone)]
pub struct ChatArgs {
    #[command(flatten)]
    pub turn: TurnArgs,
}

/// Display settings with the run's color switches applied.
pub(crate) fn display_settings(resolved: &ResolvedTurn) -> Settings {
    let mut settings = Settings::load();
    if resolved.no_color || !io::stdout().is_terminal() {
        settings.display.enable_colors = false;
    }
    settings
}

/// Graph client when mailbox functions are wanted and credentials exist.
pub(crate) fn mailbox_client(resolved: &ResolvedTurn) -> Result<Option<GraphClient>, String> {
    if !resolved.tools {
        debug!("mailbox functions disabled by flag or profile");
        return Ok(None);
    }
    if !GraphSettings::is_configured() {
        warn!("mailbox functions disabled: set TENANT_ID, CLIENT_ID and CLIENT_SECRET to enable them");
        return Ok(None);
    }
    let mut client = GraphClient::from_env().map_err(|err| err.to_string())?;
    client.set_default_user(resolved.user.clone());
    if let Some(secs) = resolved.options.timeout_secs {
        client = client.with_timeout(Duration::from_secs(secs));
    }
    Ok(Some(client))
}

pub(crate) fn build_session(resolved: &ResolvedTurn, quiet: bool) -> Result<ChatSession, String> {
    debug!(
        api = resolved.options.api.as_str(),
        model = %resolved.options.model,
        api_key_present = is_api_key_present(),
        "resolved chat session"
    );
    let llm = LlmClient::from_env().map_err(|err| err.to_string())?;
    let graph = mailbox_client(resolved)?;
    let formatter = ResponseFormatter::new(display_settings(resolved), resolved.mode);
    Ok(ChatSession::new(
        llm,
        graph,
        resolved.options.clone(),
        resolved.system.as_deref(),
        formatter,
    )
    .with_progress(ProgressDisplay::new(quiet)))
}

pub async fn run(args: ChatArgs, quiet: bool) -> Result<(), String> {
    let resolved = args.turn.resolve()?;
    let mut session = build_session(&resolved, quiet)?;
    let stdin = io::stdin();
    session
        .run_repl(stdin.lock(), io::stdout())
        .await
        .map_err(|err| err.to_string())
}
