use clap::{Args, Subcommand};
use serde_json::{Map, Value, json};

use crate::graph::functions::MailboxFunction;
use crate::graph::{GraphClient, api_base_from_env, default_user_from_env};

#[derive(Debug, Args, Clone)]
pub struct ToolsArgs {
    #[command(subcommand)]
    command: ToolsSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ToolsSubcommand {
    /// List the mailbox functions offered to the model
    List {
        /// Print the tool declarations as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run one mailbox function directly
    Call {
        name: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Print the planned Graph request without sending it
        #[arg(long)]
        dry_run: bool,
        /// Mailbox used when the arguments carry no userId
        #[arg(long)]
        user: Option<String>,
    },
}

fn parse_args(raw: &str) -> Result<Value, String> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| format!("Invalid --args JSON: {err}"))?;
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err("Invalid --args JSON: expected an object.".to_string()),
    }
}

fn lookup(name: &str) -> Result<MailboxFunction, String> {
    MailboxFunction::from_name(name).ok_or_else(|| {
        format!("Unknown function '{name}'. Run 'mailchat tools list' to see available functions.")
    })
}

fn list(json: bool) -> Result<(), String> {
    if json {
        let declarations: Vec<Value> = MailboxFunction::ALL
            .into_iter()
            .map(|function| function.definition().to_responses_json())
            .collect();
        let raw = serde_json::to_string_pretty(&declarations)
            .map_err(|err| format!("Failed to serialize tools: {err}"))?;
        println!("{raw}");
        return Ok(());
    }
    for function in MailboxFunction::ALL {
        println!("{:<22} {}", function.name(), function.description());
    }
    Ok(())
}

async fn call(
    name: &str,
    raw_args: &str,
    dry_run: bool,
    user: Option<String>,
) -> Result<(), String> {
    let function = lookup(name)?;
    let args = parse_args(raw_args)?;

    if dry_run {
        let default_user = user.or_else(default_user_from_env);
        let request = function
            .plan(&args, default_user.as_deref())
            .map_err(|err| err.to_string())?;
        let body = json!({
            "dry_run": true,
            "function": function.name(),
            "request": request.to_json(&api_base_from_env()),
        });
        println!("{body}");
        return Ok(());
    }

    let mut client = GraphClient::from_env().map_err(|err| err.to_string())?;
    client.set_default_user(user);
    let result = client.call(function.name(), &args).await;
    let raw = serde_json::to_string_pretty(&result)
        .map_err(|err| format!("Failed to serialize result: {err}"))?;
    println!("{raw}");
    Ok(())
}

pub async fn run(args: ToolsArgs) -> Result<(), String> {
    match args.command {
        ToolsSubcommand::List { json } => list(json),
        ToolsSubcommand::Call {
            name,
            args,
            dry_run,
            user,
        } => call(&name, &args, dry_run, user).await,
    }
}
