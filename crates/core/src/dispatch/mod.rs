pub mod handlers;

use async_trait::async_trait;
use chrono::Utc;

use crate::config::BotConfig;
use crate::domain::{Entities, Intent, Language, NlpResult, ResponseEnvelope, Sentiment};
use crate::errors::HandlerError;
use crate::gateway::ApiGateway;
use crate::knowledge::{KnowledgeBase, TemplateKey};

/// Shared collaborators a handler may consult while composing text.
pub struct HandlerContext<'a> {
    pub knowledge: &'a KnowledgeBase,
    pub gateway: &'a dyn ApiGateway,
}

/// One handler per intent. Handlers return raw response text; tone
/// adjustment and envelope assembly stay with the dispatcher.
///
/// Backend failures are a handler concern: each handler turns an
/// [`crate::gateway::ApiError`] into localized apology text instead of
/// returning an error. Only genuinely unexpected conditions, such as a
/// malformed backend record, may escape as [`HandlerError`].
#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        user_id: Option<&str>,
    ) -> Result<String, HandlerError>;
}

fn handler_for(intent: Intent) -> &'static dyn IntentHandler {
    match intent {
        Intent::Greeting => &handlers::GreetingHandler,
        Intent::ProductInfo => &handlers::ProductInfoHandler,
        Intent::Pricing => &handlers::PricingHandler,
        Intent::Shipping => &handlers::ShippingHandler,
        Intent::Returns => &handlers::ReturnsHandler,
        Intent::TechnicalSupport => &handlers::TechnicalSupportHandler,
        Intent::OrderStatus => &handlers::OrderStatusHandler,
        Intent::Account => &handlers::AccountHandler,
        Intent::Unknown => &handlers::UnknownHandler,
    }
}

/// Routes an analyzed message to its intent handler and assembles the
/// response envelope. Dispatch never fails: anything escaping a
/// handler is converted into a technical-error response.
pub struct Dispatcher {
    config: BotConfig,
}

impl Dispatcher {
    pub fn new(config: BotConfig) -> Self {
        Self { config }
    }

    pub async fn dispatch(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        user_id: Option<&str>,
    ) -> ResponseEnvelope {
        match self.respond(ctx, nlp, user_id).await {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::error!(
                    event_name = "dispatch.handler_failed",
                    intent = %nlp.intent,
                    error = %error,
                    "handler failed, serving technical-error response"
                );
                self.error_envelope(nlp)
            }
        }
    }

    async fn respond(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        user_id: Option<&str>,
    ) -> Result<ResponseEnvelope, HandlerError> {
        if nlp.intent_confidence < self.config.intent.confidence_threshold {
            tracing::debug!(
                event_name = "dispatch.low_confidence",
                intent = %nlp.intent,
                confidence = nlp.intent_confidence,
                "confidence below threshold, trying FAQ then fallback"
            );
            return Ok(self.low_confidence_response(ctx, nlp));
        }

        let handler = handler_for(nlp.intent);
        let raw_text = handler.handle(ctx, nlp, user_id).await?;

        let sentiment = self.classify_sentiment(nlp.sentiment.polarity);
        let text = adjust_tone(ctx, raw_text, sentiment, nlp.language);

        Ok(ResponseEnvelope {
            text,
            intent: nlp.intent.as_str().to_string(),
            confidence: nlp.intent_confidence,
            language: nlp.language,
            sentiment,
            entities: nlp.entities.clone(),
            timestamp: Utc::now(),
        })
    }

    /// Low-confidence messages are answered from the FAQ when one
    /// matches and from the fallback template otherwise. These replies
    /// always report neutral sentiment and skip tone adjustment, even
    /// when the message polarity is strong.
    fn low_confidence_response(&self, ctx: &HandlerContext<'_>, nlp: &NlpResult) -> ResponseEnvelope {
        let text = ctx
            .knowledge
            .search_faq(&nlp.original_text, nlp.language)
            .unwrap_or_else(|| ctx.knowledge.template(TemplateKey::Fallback, nlp.language));

        ResponseEnvelope {
            text,
            intent: Intent::Unknown.as_str().to_string(),
            confidence: nlp.intent_confidence,
            language: nlp.language,
            sentiment: Sentiment::Neutral,
            entities: nlp.entities.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Polarity exactly at a threshold classifies as neutral; only
    /// strictly crossing a threshold changes the label.
    fn classify_sentiment(&self, polarity: f64) -> Sentiment {
        if polarity > self.config.sentiment.positive_threshold {
            Sentiment::Positive
        } else if polarity < self.config.sentiment.negative_threshold {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    fn error_envelope(&self, nlp: &NlpResult) -> ResponseEnvelope {
        let text = match nlp.language {
            Language::En => {
                "I'm sorry, a technical error occurred. Please try again or contact our support team."
            }
            Language::Es => {
                "Lo siento, ocurrió un error técnico. Por favor intenta de nuevo o contacta a nuestro equipo de soporte."
            }
        };

        ResponseEnvelope {
            text: text.to_string(),
            intent: "error".to_string(),
            confidence: 1.0,
            language: nlp.language,
            sentiment: Sentiment::Neutral,
            entities: Entities::default(),
            timestamp: Utc::now(),
        }
    }
}

fn adjust_tone(
    ctx: &HandlerContext<'_>,
    text: String,
    sentiment: Sentiment,
    language: Language,
) -> String {
    match ctx.knowledge.tone_prefix(sentiment, language) {
        Some(prefix) => format!("{prefix}{text}"),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::BotConfig;
    use crate::domain::{Intent, Language, NlpResult, Sentiment};
    use crate::gateway::{DemoApiGateway, ScriptedGateway};
    use crate::knowledge::{FixedSelector, KnowledgeBase};
    use crate::nlp::NlpPipeline;

    use super::{Dispatcher, HandlerContext};

    fn nlp(text: &str) -> NlpResult {
        NlpPipeline::new(&BotConfig::default()).process(text)
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(Language::En, Box::new(FixedSelector(0)))
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(BotConfig::default())
    }

    #[tokio::test]
    async fn confident_greeting_produces_greeting_envelope() {
        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        let envelope = dispatcher().dispatch(&ctx, &nlp("Hello"), None).await;

        assert_eq!(envelope.intent, "greeting");
        assert!(envelope.confidence >= 0.6);
        assert_eq!(envelope.text, "Hello! How can I help you today?");
        assert_eq!(envelope.sentiment, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn low_confidence_envelope_reports_unknown_and_neutral() {
        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        // Force a strong polarity onto an unclassifiable message; the
        // low-confidence reply must stay neutral anyway.
        let mut query = nlp("zxcvq wertyu asdfg");
        query.sentiment.polarity = -0.8;

        let envelope = dispatcher().dispatch(&ctx, &query, None).await;

        assert_eq!(envelope.intent, "unknown");
        assert_eq!(envelope.confidence, 0.0);
        assert_eq!(envelope.sentiment, Sentiment::Neutral);
        assert_eq!(
            envelope.text,
            "I'm not sure I understand. Could you please rephrase your question?"
        );
    }

    #[tokio::test]
    async fn low_confidence_consults_the_faq_first() {
        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        let mut query = nlp("Do you know if paypal payment works there");
        query.intent = Intent::Unknown;
        query.intent_confidence = 0.2;

        let envelope = dispatcher().dispatch(&ctx, &query, None).await;

        assert_eq!(envelope.intent, "unknown");
        assert_eq!(envelope.text, "We accept credit cards, debit cards, PayPal, and bank transfers.");
    }

    #[tokio::test]
    async fn negative_polarity_prepends_apologetic_prefix() {
        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        let mut query = nlp("Hello");
        query.sentiment.polarity = -0.5;

        let envelope = dispatcher().dispatch(&ctx, &query, None).await;

        assert_eq!(envelope.sentiment, Sentiment::Negative);
        assert!(envelope.text.starts_with(
            "I understand your frustration. Let me help resolve this for you. "
        ));
        assert!(envelope.text.ends_with("Hello! How can I help you today?"));
    }

    #[tokio::test]
    async fn positive_polarity_prepends_upbeat_prefix() {
        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        let mut query = nlp("Hello");
        query.sentiment.polarity = 0.4;

        let envelope = dispatcher().dispatch(&ctx, &query, None).await;

        assert_eq!(envelope.sentiment, Sentiment::Positive);
        assert!(envelope.text.starts_with("I'm glad to help! "));
    }

    #[tokio::test]
    async fn polarity_at_the_threshold_stays_neutral() {
        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        for polarity in [0.1, -0.1] {
            let mut query = nlp("Hello");
            query.sentiment.polarity = polarity;

            let envelope = dispatcher().dispatch(&ctx, &query, None).await;

            assert_eq!(envelope.sentiment, Sentiment::Neutral, "polarity {polarity}");
            assert_eq!(envelope.text, "Hello! How can I help you today?");
        }
    }

    #[tokio::test]
    async fn order_status_scenario_apologizes_for_unknown_order() {
        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        let envelope =
            dispatcher().dispatch(&ctx, &nlp("What is the status of order ORD12345"), None).await;

        assert_eq!(envelope.intent, "order_status");
        assert!(envelope.confidence >= 0.6);
        assert_eq!(
            envelope.text,
            "Sorry, I couldn't find order ORD12345. Please check the order number."
        );
        assert!(envelope.entities.order_numbers.contains("ORD12345"));
    }

    #[tokio::test]
    async fn handler_failure_produces_the_error_envelope() {
        let kb = kb();
        let gateway = ScriptedGateway::new(vec![Ok(json!({"order_id": "ORD10001"}))]);
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        let envelope =
            dispatcher().dispatch(&ctx, &nlp("What is the status of order ORD10001"), None).await;

        assert_eq!(envelope.intent, "error");
        assert_eq!(envelope.confidence, 1.0);
        assert_eq!(envelope.sentiment, Sentiment::Neutral);
        assert!(envelope.entities.is_empty());
        assert_eq!(
            envelope.text,
            "I'm sorry, a technical error occurred. Please try again or contact our support team."
        );
    }

    #[tokio::test]
    async fn error_envelope_is_localized() {
        let kb = kb();
        let gateway = ScriptedGateway::new(vec![Ok(json!({"order_id": "ORD10001"}))]);
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        let envelope = dispatcher()
            .dispatch(&ctx, &nlp("¿Cuál es el estado de mi pedido ORD10001?"), None)
            .await;

        assert_eq!(envelope.intent, "error");
        assert_eq!(envelope.language, Language::Es);
        assert!(envelope.text.starts_with("Lo siento, ocurrió un error técnico."));
    }

    #[tokio::test]
    async fn spanish_greeting_is_answered_in_spanish() {
        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        let envelope = dispatcher().dispatch(&ctx, &nlp("Hola"), None).await;

        assert_eq!(envelope.language, Language::Es);
        assert_eq!(envelope.text, "¡Hola! ¿Cómo puedo ayudarte hoy?");
    }

    #[tokio::test]
    async fn zero_threshold_routes_unknown_to_its_handler() {
        let mut config = BotConfig::default();
        config.intent.confidence_threshold = 0.0;

        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        let envelope =
            Dispatcher::new(config).dispatch(&ctx, &nlp("zxcvq wertyu asdfg"), None).await;

        assert_eq!(envelope.intent, "unknown");
        assert_eq!(
            envelope.text,
            "I'm not sure I understand. Could you please rephrase your question?"
        );
    }

    #[tokio::test]
    async fn unknown_answers_from_the_faq_on_both_sides_of_the_threshold() {
        let kb = kb();
        let gateway = DemoApiGateway::new();
        let ctx = HandlerContext { knowledge: &kb, gateway: &gateway };

        // An FAQ-answerable query with no intent lexicon hits lands on
        // Unknown at confidence 0.0; the reply must not depend on
        // whether that routes through the low-confidence branch or the
        // unknown-intent handler.
        let query = nlp("warranty coverage");
        let expected = "All products come with a one-year manufacturer warranty covering defects.";

        let low_confidence = dispatcher().dispatch(&ctx, &query, None).await;
        assert_eq!(low_confidence.intent, "unknown");
        assert_eq!(low_confidence.text, expected);

        let mut config = BotConfig::default();
        config.intent.confidence_threshold = 0.0;
        let handled = Dispatcher::new(config).dispatch(&ctx, &query, None).await;
        assert_eq!(handled.intent, "unknown");
        assert_eq!(handled.text, expected);
    }
}
