use std::process;

use clap::Parser;
use mailchat::build_info::LONG_VERSION;
use mailchat::commands::chat::{self, ChatArgs};
use mailchat::logging;

#[derive(Debug, Parser)]
#[command(
    name = "mcchat",
    about = "Interactive mailbox chat",
    version,
    long_version = LONG_VERSION
)]
struct Cli {
    #[arg(short, long)]
    verbose: bool,
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    #[command(flatten)]
    chat: ChatArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    if let Err(err) = chat::run(cli.chat, cli.quiet).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
