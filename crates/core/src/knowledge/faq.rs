use std::collections::{BTreeSet, HashMap};

use crate::domain::Language;
use crate::nlp::{normalize_text, tokenize};

/// Query tokens must hit at least this many keywords before an entry
/// is considered a match.
const MINIMUM_OVERLAP: usize = 2;

pub struct FaqEntry {
    pub topic: String,
    keywords: Vec<String>,
    answers: HashMap<Language, String>,
}

/// Keyword-overlap FAQ search. The entry with the most distinct
/// keyword hits wins; ties keep the earlier entry.
pub struct FaqIndex {
    entries: Vec<FaqEntry>,
    default_language: Language,
}

impl FaqIndex {
    pub fn with_builtin_entries(default_language: Language) -> Self {
        Self {
            default_language,
            entries: vec![
                entry(
                    "shipping_time",
                    &[
                        "shipping", "time", "long", "delivery", "arrive", "takes", "envio",
                        "envío", "entrega", "tarda", "llega", "dias", "días",
                    ],
                    "Standard shipping takes 5-7 business days. Express shipping takes 1-2 business days.",
                    "El envío estándar tarda de 5 a 7 días hábiles. El envío exprés tarda de 1 a 2 días hábiles.",
                ),
                entry(
                    "return_policy",
                    &[
                        "return", "policy", "refund", "days", "devolver", "devolucion",
                        "devolución", "politica", "política", "reembolso",
                    ],
                    "You can return products within 30 days of purchase. Items must be in original condition with receipt.",
                    "Puedes devolver productos dentro de los 30 días posteriores a la compra. Los artículos deben estar en su condición original con el recibo.",
                ),
                entry(
                    "payment_methods",
                    &[
                        "payment", "methods", "pay", "credit", "card", "paypal", "pago",
                        "metodos", "métodos", "tarjeta", "pagar",
                    ],
                    "We accept credit cards, debit cards, PayPal, and bank transfers.",
                    "Aceptamos tarjetas de crédito, tarjetas de débito, PayPal y transferencias bancarias.",
                ),
                entry(
                    "warranty",
                    &[
                        "warranty", "guarantee", "covered", "coverage", "garantia", "garantía",
                        "cobertura", "cubre",
                    ],
                    "All products come with a one-year manufacturer warranty covering defects.",
                    "Todos los productos incluyen una garantía del fabricante de un año que cubre defectos.",
                ),
            ],
        }
    }

    pub fn search(&self, query: &str, language: Language) -> Option<String> {
        let query_tokens =
            tokenize(&normalize_text(query)).into_iter().collect::<BTreeSet<_>>();
        if query_tokens.is_empty() {
            return None;
        }

        let mut best_entry: Option<&FaqEntry> = None;
        let mut best_overlap = 0usize;

        for candidate in &self.entries {
            let overlap = candidate
                .keywords
                .iter()
                .filter(|keyword| query_tokens.contains(keyword.as_str()))
                .count();
            if overlap > best_overlap {
                best_entry = Some(candidate);
                best_overlap = overlap;
            }
        }

        if best_overlap < MINIMUM_OVERLAP {
            return None;
        }

        let matched = best_entry?;
        tracing::debug!(
            event_name = "knowledge.faq_matched",
            topic = %matched.topic,
            overlap = best_overlap,
            "answering from the faq"
        );
        self.answer_for(matched, language)
    }

    fn answer_for(&self, matched: &FaqEntry, language: Language) -> Option<String> {
        matched
            .answers
            .get(&language)
            .or_else(|| matched.answers.get(&self.default_language))
            .cloned()
    }
}

fn entry(topic: &str, keywords: &[&str], answer_en: &str, answer_es: &str) -> FaqEntry {
    FaqEntry {
        topic: topic.to_string(),
        keywords: keywords.iter().map(|keyword| (*keyword).to_string()).collect(),
        answers: HashMap::from([
            (Language::En, answer_en.to_string()),
            (Language::Es, answer_es.to_string()),
        ]),
    }
}
