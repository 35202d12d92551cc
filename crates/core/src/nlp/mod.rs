pub mod entities;
pub mod intent;
pub mod language;
pub mod sentiment;

pub use entities::EntityExtractor;
pub use intent::IntentClassifier;
pub use language::LanguageDetector;
pub use sentiment::SentimentAnalyzer;

use crate::config::BotConfig;
use crate::domain::NlpResult;

/// Runs every analysis stage over one message and bundles the results.
///
/// The pipeline itself never fails: unrecognized input degrades to the
/// default language, [`crate::domain::Intent::Unknown`] with zero
/// confidence, neutral polarity, and empty entity sets.
pub struct NlpPipeline {
    detector: LanguageDetector,
    classifier: IntentClassifier,
    analyzer: SentimentAnalyzer,
    extractor: EntityExtractor,
}

impl NlpPipeline {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            detector: LanguageDetector::new(
                config.language.supported.clone(),
                config.language.default,
            ),
            classifier: IntentClassifier::new(),
            analyzer: SentimentAnalyzer::new(),
            extractor: EntityExtractor::new(),
        }
    }

    pub fn process(&self, text: &str) -> NlpResult {
        let normalized = normalize_text(text);
        let tokens = tokenize(&normalized);

        let language = self.detector.detect(&tokens);
        let (intent, intent_confidence) = self.classifier.classify(&tokens);
        let sentiment = self.analyzer.score(&tokens);
        let entities = self.extractor.extract(&tokens);

        tracing::debug!(
            event_name = "nlp.processed",
            language = %language,
            intent = %intent,
            confidence = intent_confidence,
            polarity = sentiment.polarity,
            token_count = tokens.len(),
            "analyzed message"
        );

        NlpResult {
            original_text: text.to_string(),
            language,
            tokens,
            intent,
            intent_confidence,
            sentiment,
            entities,
        }
    }
}

pub(crate) fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

pub(crate) fn tokenize(normalized_text: &str) -> Vec<String> {
    let mut sanitized = String::with_capacity(normalized_text.len());
    for character in normalized_text.chars() {
        if character.is_alphanumeric() {
            sanitized.push(character);
        } else {
            sanitized.push(' ');
        }
    }
    sanitized.split_whitespace().map(|token| token.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use crate::config::BotConfig;
    use crate::domain::{Intent, Language};

    use super::{normalize_text, tokenize, NlpPipeline};

    #[test]
    fn tokenize_strips_punctuation_and_keeps_accents() {
        let tokens = tokenize(&normalize_text("¿Dónde está mi pedido, ORD10001?"));
        assert_eq!(tokens, vec!["dónde", "está", "mi", "pedido", "ord10001"]);
    }

    #[test]
    fn greeting_flows_through_the_whole_pipeline() {
        let pipeline = NlpPipeline::new(&BotConfig::default());
        let result = pipeline.process("Hello");

        assert_eq!(result.language, Language::En);
        assert_eq!(result.intent, Intent::Greeting);
        assert!(result.intent_confidence >= 0.6);
        assert_eq!(result.sentiment.polarity, 0.0);
        assert!(result.entities.is_empty());
        assert_eq!(result.original_text, "Hello");
    }

    #[test]
    fn spanish_order_query_is_fully_analyzed() {
        let pipeline = NlpPipeline::new(&BotConfig::default());
        let result = pipeline.process("¿Cuál es el estado de mi pedido ORD10001?");

        assert_eq!(result.language, Language::Es);
        assert_eq!(result.intent, Intent::OrderStatus);
        assert!(result.intent_confidence >= 0.6);
        assert_eq!(result.entities.first_order_number(), Some("ORD10001"));
    }

    #[test]
    fn empty_message_degrades_without_failing() {
        let pipeline = NlpPipeline::new(&BotConfig::default());
        let result = pipeline.process("");

        assert_eq!(result.language, Language::En);
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.intent_confidence, 0.0);
        assert!(result.tokens.is_empty());
        assert!(result.entities.is_empty());
    }
}
