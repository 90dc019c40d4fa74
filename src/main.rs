use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use mailchat::build_info::LONG_VERSION;
use mailchat::commands::ask::{self, AskArgs};
use mailchat::commands::chat::{self, ChatArgs};
use mailchat::commands::config::{self, ConfigArgs};
use mailchat::commands::tools::{self, ToolsArgs};
use mailchat::logging;

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  mailchat chat --mode verbose\n  mailchat ask \"How many unread emails do I have?\"\n  echo \"Summarise my drafts\" | mailchat ask --json\n  mailchat tools call listEmails --args '{\"top\": 3}' --dry-run\n  mailchat config mode debug\n  mailchat completion bash > ~/.local/share/bash-completion/completions/mailchat";

const ASK_HELP_EXAMPLES: &str = "Examples:\n  mailchat ask \"What is on my calendar this week?\"\n  echo \"List my drafts\" | mailchat ask --api chat --model gpt-4o\n  mailchat ask --profile work --dry-run \"Forward invoices to finance\"";

const TOOLS_HELP_EXAMPLES: &str = "Examples:\n  mailchat tools list\n  mailchat tools call getMailboxSettings --user me@example.com\n  mailchat tools call sendEmail --args '{\"to\": [\"a@example.com\"], \"subject\": \"Hi\", \"body\": \"Hello\"}' --dry-run";

#[derive(Debug, Parser)]
#[command(
    name = "mailchat",
    about = "Chat with OpenAI models that can read and act on a Microsoft 365 mailbox",
    version,
    long_version = LONG_VERSION,
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    /// No logging and no spinner
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Start an interactive chat")]
    Chat(ChatArgs),
    #[command(about = "Send a single prompt", after_help = ASK_HELP_EXAMPLES)]
    Ask(AskArgs),
    #[command(about = "Inspect or run mailbox functions", after_help = TOOLS_HELP_EXAMPLES)]
    Tools(ToolsArgs),
    #[command(about = "Manage profiles and display settings")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "mailchat", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "mailchat", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "mailchat", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Chat(args) => chat::run(args, cli.quiet).await,
        Commands::Ask(args) => ask::run(args, cli.quiet).await,
        Commands::Tools(args) => tools::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
