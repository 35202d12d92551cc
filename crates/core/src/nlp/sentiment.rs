use crate::domain::SentimentScore;

const POSITIVE_WORDS: &[&str] = &[
    "great", "good", "excellent", "amazing", "wonderful", "fantastic", "love", "happy",
    "thanks", "thank", "perfect", "awesome", "nice", "helpful", "pleased", "excelente",
    "gracias", "genial", "bueno", "buena", "perfecto", "feliz", "maravilloso", "encanta",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "hate", "angry", "frustrated", "disappointed",
    "broken", "worst", "useless", "annoyed", "upset", "unhappy", "malo", "mala", "odio",
    "enojado", "frustrado", "molesto", "decepcionado", "roto", "pesimo", "pésimo",
];

/// Word-count polarity over fixed positive and negative vocabularies.
///
/// Each hit moves the score by 0.2, so five unopposed words saturate
/// the scale. The result always lies within `-1.0..=1.0`.
#[derive(Clone, Debug, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, tokens: &[String]) -> SentimentScore {
        let positive = count_hits(tokens, POSITIVE_WORDS);
        let negative = count_hits(tokens, NEGATIVE_WORDS);

        let polarity = (positive as f64 - negative as f64) / 5.0;
        SentimentScore { polarity: polarity.clamp(-1.0, 1.0) }
    }
}

fn count_hits(tokens: &[String], vocabulary: &[&str]) -> usize {
    tokens.iter().filter(|token| vocabulary.contains(&token.as_str())).count()
}

#[cfg(test)]
mod tests {
    use crate::nlp::{normalize_text, tokenize};

    use super::SentimentAnalyzer;

    fn polarity(text: &str) -> f64 {
        SentimentAnalyzer::new().score(&tokenize(&normalize_text(text))).polarity
    }

    #[test]
    fn positive_words_raise_polarity() {
        let value = polarity("This is great, thanks for the excellent help");
        assert!(value > 0.0);
        assert!((value - 0.6).abs() < 1e-9);
    }

    #[test]
    fn negative_words_lower_polarity() {
        let value = polarity("This is terrible and awful, I hate it");
        assert!((value - (-0.6)).abs() < 1e-9);
    }

    #[test]
    fn mixed_words_cancel_out() {
        assert_eq!(polarity("good but broken"), 0.0);
    }

    #[test]
    fn neutral_text_scores_zero() {
        assert_eq!(polarity("What is the status of my order"), 0.0);
    }

    #[test]
    fn polarity_saturates_at_the_scale_ends() {
        let value =
            polarity("terrible awful horrible bad worst useless broken");
        assert_eq!(value, -1.0);
    }

    #[test]
    fn spanish_vocabulary_is_scored() {
        assert!(polarity("Gracias, el producto es excelente") > 0.0);
        assert!(polarity("El producto llegó roto, pésimo servicio") < 0.0);
    }
}
