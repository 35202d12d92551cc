use crate::domain::Language;

/// Marker vocabulary per language, matched against lowercased tokens.
const MARKERS: &[(Language, &[&str])] = &[
    (
        Language::En,
        &[
            "hello", "hi", "hey", "the", "is", "my", "what", "where", "when", "how", "please",
            "thanks", "thank", "order", "account", "help", "return", "price", "status", "can",
            "you", "need", "want", "for", "with",
        ],
    ),
    (
        Language::Es,
        &[
            "hola", "gracias", "por", "favor", "ayuda", "necesito", "quiero", "como", "cómo",
            "que", "qué", "donde", "dónde", "cual", "cuál", "cuanto", "cuánto", "pedido",
            "cuenta", "precio", "envío", "envio", "producto", "estado", "devolver", "devolución",
            "problema", "información", "informacion", "mi", "el", "la", "los", "las", "es", "de",
            "con", "para",
        ],
    ),
];

/// Guesses the message language from marker-word hits. A language must
/// strictly out-score every other supported candidate to win; ties and
/// zero hits fall back to the configured default.
pub struct LanguageDetector {
    supported: Vec<Language>,
    default: Language,
}

impl LanguageDetector {
    pub fn new(supported: Vec<Language>, default: Language) -> Self {
        Self { supported, default }
    }

    pub fn detect(&self, tokens: &[String]) -> Language {
        let mut counts: Vec<(Language, usize)> = Vec::with_capacity(MARKERS.len());
        for (language, markers) in MARKERS {
            if !self.supported.contains(language) {
                continue;
            }
            let count =
                tokens.iter().filter(|token| markers.contains(&token.as_str())).count();
            counts.push((*language, count));
        }

        let Some(&(leader, leader_count)) = counts.iter().max_by_key(|(_, count)| *count) else {
            return self.default;
        };
        let tied = counts.iter().filter(|(_, count)| *count == leader_count).count();
        if leader_count == 0 || tied > 1 {
            return self.default;
        }

        leader
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::Language;
    use crate::nlp::{normalize_text, tokenize};

    use super::LanguageDetector;

    fn detect(text: &str) -> Language {
        let detector = LanguageDetector::new(vec![Language::En, Language::Es], Language::En);
        detector.detect(&tokenize(&normalize_text(text)))
    }

    #[test]
    fn detects_common_phrases() {
        struct Case {
            text: &'static str,
            expected: Language,
        }

        let cases = vec![
            Case { text: "Hello, how are you?", expected: Language::En },
            Case { text: "What is the status of my order?", expected: Language::En },
            Case { text: "Hola, necesito ayuda con mi pedido", expected: Language::Es },
            Case { text: "¿Cuál es el precio del laptop?", expected: Language::Es },
            Case { text: "Gracias por la ayuda", expected: Language::Es },
        ];

        for (index, case) in cases.iter().enumerate() {
            assert_eq!(
                detect(case.text),
                case.expected,
                "case {index} misdetected: {}",
                case.text
            );
        }
    }

    #[test]
    fn unrecognized_text_falls_back_to_default() {
        assert_eq!(detect("zxcvq wertyu asdfg"), Language::En);
    }

    #[test]
    fn equal_marker_counts_fall_back_to_default() {
        // one marker hit per language
        let tokens = tokenize(&normalize_text("hello gracias"));

        let default_en = LanguageDetector::new(vec![Language::En, Language::Es], Language::En);
        assert_eq!(default_en.detect(&tokens), Language::En);

        let default_es = LanguageDetector::new(vec![Language::En, Language::Es], Language::Es);
        assert_eq!(default_es.detect(&tokens), Language::Es);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        let detector = LanguageDetector::new(vec![Language::En, Language::Es], Language::Es);
        assert_eq!(detector.detect(&[]), Language::Es);
    }

    #[test]
    fn unsupported_language_is_never_returned() {
        let detector = LanguageDetector::new(vec![Language::En], Language::En);
        let tokens = tokenize(&normalize_text("Hola necesito ayuda por favor"));
        assert_eq!(detector.detect(&tokens), Language::En);
    }
}
