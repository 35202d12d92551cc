use helply_core::{BotConfig, ChatRequest, LoadOptions};

use crate::commands::{build_chatbot, build_runtime, CommandResult};

pub fn run(message: &str, user: Option<&str>, json: bool) -> CommandResult {
    let config = match BotConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("ask", "config_validation", error.to_string(), 2)
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        }
    };

    let chatbot = build_chatbot(config);
    let mut request = ChatRequest::new(message);
    if let Some(user) = user {
        request = request.with_user(user);
    }

    let envelope = match runtime.block_on(chatbot.process(request)) {
        Ok(envelope) => envelope,
        Err(error) => {
            return CommandResult::failure("ask", "invalid_request", error.user_message(), 4)
        }
    };

    let output = if json {
        serde_json::to_string_pretty(&envelope).unwrap_or_else(|error| {
            format!("{{\"error\":\"serialization failed: {error}\"}}")
        })
    } else {
        envelope.text
    };

    CommandResult { exit_code: 0, output }
}
