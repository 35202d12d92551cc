use std::sync::Arc;

use helply_core::{BotConfig, Chatbot, DemoApiGateway, KnowledgeBase};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub chatbot: Arc<Chatbot>,
}

/// Assembles the bot from an already loaded configuration. The demo
/// gateway stands in for real backend services.
pub fn bootstrap_with_config(config: BotConfig) -> AppState {
    let knowledge = Arc::new(KnowledgeBase::with_defaults(config.language.default));
    let gateway = Arc::new(DemoApiGateway::new());
    let chatbot = Arc::new(Chatbot::new(config, knowledge, gateway));

    tracing::info!(
        event_name = "system.bootstrap.completed",
        correlation_id = "bootstrap",
        "chatbot runtime assembled"
    );

    AppState { chatbot }
}
