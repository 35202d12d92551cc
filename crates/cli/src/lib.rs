pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "helply",
    about = "Helply support bot CLI",
    long_about = "Talk to the Helply support bot from the terminal, inspect its effective configuration, or run an interactive session.",
    after_help = "Examples:\n  helply ask \"What is the status of order ORD10001?\"\n  helply ask --json \"Hello\"\n  helply chat --user alice\n  helply config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Send a single message and print the bot reply")]
    Ask {
        #[arg(help = "Message text to send")]
        message: String,
        #[arg(long, help = "User id to attribute the message to")]
        user: Option<String>,
        #[arg(long, help = "Emit the full response envelope as JSON")]
        json: bool,
    },
    #[command(about = "Start an interactive chat session on stdin")]
    Chat {
        #[arg(long, help = "User id to attribute the session to")]
        user: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ask { message, user, json } => commands::ask::run(&message, user.as_deref(), json),
        Command::Chat { user } => commands::chat::run(user.as_deref()),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
