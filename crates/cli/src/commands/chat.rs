use std::io::{self, BufRead, Write};

use helply_core::{BotConfig, ChatRequest, Chatbot, LoadOptions};

use crate::commands::{build_chatbot, build_runtime, CommandResult};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LineOutcome {
    Reply(String),
    Silent,
    Quit,
}

pub fn run(user: Option<&str>) -> CommandResult {
    let config = match BotConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("chat", "config_validation", error.to_string(), 2)
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        }
    };

    let chatbot = build_chatbot(config);

    println!("Helply support chat. Type /quit to leave, /history to review, /clear to reset.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("you> ");
        let _ = io::stdout().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(error) => {
                return CommandResult::failure("chat", "io", error.to_string(), 5);
            }
        }

        match runtime.block_on(handle_line(&chatbot, user, line.trim())) {
            LineOutcome::Quit => break,
            LineOutcome::Silent => {}
            LineOutcome::Reply(reply) => println!("{reply}"),
        }
    }

    CommandResult { exit_code: 0, output: "Session ended.".to_string() }
}

/// One REPL turn. Meta commands are handled locally; everything else goes
/// through the bot.
pub(crate) async fn handle_line(
    chatbot: &Chatbot,
    user: Option<&str>,
    line: &str,
) -> LineOutcome {
    match line {
        "" => LineOutcome::Silent,
        "/quit" | "/exit" => LineOutcome::Quit,
        "/history" => {
            let history = chatbot.history(user);
            if history.is_empty() {
                return LineOutcome::Reply("No conversation history yet.".to_string());
            }
            let lines: Vec<String> = history
                .iter()
                .map(|entry| {
                    format!(
                        "[{}] {}: {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.user_id.as_deref().unwrap_or("anonymous"),
                        entry.message
                    )
                })
                .collect();
            LineOutcome::Reply(lines.join("\n"))
        }
        "/clear" => {
            let removed = chatbot.clear_history(user);
            LineOutcome::Reply(format!("Cleared {removed} stored turns."))
        }
        message => {
            let mut request = ChatRequest::new(message);
            if let Some(user) = user {
                request = request.with_user(user);
            }
            match chatbot.process(request).await {
                Ok(envelope) => LineOutcome::Reply(envelope.text),
                Err(error) => LineOutcome::Reply(error.user_message().to_string()),
            }
        }
    }
}
