use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::BotConfig;
use crate::dispatch::{Dispatcher, HandlerContext};
use crate::domain::{ConversationEntry, ResponseEnvelope};
use crate::errors::RequestError;
use crate::gateway::{ApiGateway, TimeoutApiGateway};
use crate::history::ConversationStore;
use crate::knowledge::KnowledgeBase;
use crate::nlp::NlpPipeline;

/// One inbound message. `message` is optional so transport layers can
/// hand the validation decision down to [`Chatbot::process`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub user_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: Some(message.into()), user_id: None }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// The assembled bot: NLP pipeline, dispatcher, knowledge base,
/// deadline-bounded gateway, and the shared conversation store.
pub struct Chatbot {
    pipeline: NlpPipeline,
    dispatcher: Dispatcher,
    knowledge: Arc<KnowledgeBase>,
    gateway: TimeoutApiGateway,
    store: ConversationStore,
}

impl Chatbot {
    pub fn new(
        config: BotConfig,
        knowledge: Arc<KnowledgeBase>,
        gateway: Arc<dyn ApiGateway>,
    ) -> Self {
        let pipeline = NlpPipeline::new(&config);
        let store = ConversationStore::new(config.history.cap);
        let gateway =
            TimeoutApiGateway::new(gateway, Duration::from_secs(config.api.timeout_secs));

        Self { pipeline, dispatcher: Dispatcher::new(config), knowledge, gateway, store }
    }

    /// Validates, analyzes, records, and answers one message. The only
    /// error a caller sees is a missing message; everything downstream
    /// resolves to a response envelope.
    pub async fn process(&self, request: ChatRequest) -> Result<ResponseEnvelope, RequestError> {
        let message = request.message.ok_or(RequestError::MissingMessage)?;
        let correlation_id = Uuid::new_v4();

        tracing::info!(
            event_name = "chat.message_received",
            correlation_id = %correlation_id,
            user_id = request.user_id.as_deref().unwrap_or("anonymous"),
            "processing message"
        );

        let nlp_result = self.pipeline.process(&message);
        self.store.append(ConversationEntry {
            timestamp: Utc::now(),
            user_id: request.user_id.clone(),
            message,
            nlp_result: nlp_result.clone(),
        });

        let ctx = HandlerContext { knowledge: &self.knowledge, gateway: &self.gateway };
        let envelope = self.dispatcher.dispatch(&ctx, &nlp_result, request.user_id.as_deref()).await;

        tracing::info!(
            event_name = "chat.response_ready",
            correlation_id = %correlation_id,
            intent = %envelope.intent,
            confidence = envelope.confidence,
            "response assembled"
        );

        Ok(envelope)
    }

    pub fn history(&self, user_id: Option<&str>) -> Vec<ConversationEntry> {
        self.store.history(user_id)
    }

    pub fn clear_history(&self, user_id: Option<&str>) -> usize {
        self.store.clear(user_id)
    }

    pub fn latest_interaction(&self) -> Option<DateTime<Utc>> {
        self.store.latest_timestamp()
    }
}
