pub mod catalog;
pub mod faq;
pub mod templates;

pub use catalog::{Product, ProductCatalog, ProductId};
pub use faq::{FaqEntry, FaqIndex};
pub use templates::{
    FixedSelector, RandomSelector, SeededSelector, TemplateKey, TemplateStore, VariantSelector,
};

use crate::domain::{Language, Sentiment};

/// Everything the bot knows without asking a backend: response
/// templates, the product catalog, and the FAQ index. Variant choice
/// goes through the injected [`VariantSelector`] so transcripts can be
/// made deterministic.
pub struct KnowledgeBase {
    catalog: ProductCatalog,
    faq: FaqIndex,
    templates: TemplateStore,
    selector: Box<dyn VariantSelector>,
}

impl KnowledgeBase {
    pub fn new(default_language: Language, selector: Box<dyn VariantSelector>) -> Self {
        Self {
            catalog: ProductCatalog::with_builtin_products(),
            faq: FaqIndex::with_builtin_entries(default_language),
            templates: TemplateStore::with_builtin_responses(default_language),
            selector,
        }
    }

    pub fn with_defaults(default_language: Language) -> Self {
        Self::new(default_language, Box::new(RandomSelector))
    }

    /// Replaces the builtin template set; used when operators ship
    /// their own response copy.
    pub fn with_templates(mut self, templates: TemplateStore) -> Self {
        self.templates = templates;
        self
    }

    pub fn template(&self, key: TemplateKey, language: Language) -> String {
        self.templates.render(language, key, self.selector.as_ref())
    }

    pub fn tone_prefix(&self, sentiment: Sentiment, language: Language) -> Option<String> {
        self.templates.tone_prefix(language, sentiment, self.selector.as_ref())
    }

    pub fn products(&self) -> &[Product] {
        self.catalog.all()
    }

    pub fn product_by_keyword(&self, keyword: &str) -> Option<&Product> {
        self.catalog.find_by_keyword(keyword)
    }

    pub fn product_by_id(&self, id: &str) -> Option<&Product> {
        self.catalog.by_id(id)
    }

    pub fn search_faq(&self, query: &str, language: Language) -> Option<String> {
        self.faq.search(query, language)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::domain::{Language, Sentiment};

    use super::templates::{FixedSelector, TemplateKey, TemplateStore};
    use super::KnowledgeBase;

    fn fixed_kb(slot: usize) -> KnowledgeBase {
        KnowledgeBase::new(Language::En, Box::new(FixedSelector(slot)))
    }

    #[test]
    fn template_lookup_uses_requested_language() {
        let kb = fixed_kb(0);
        assert_eq!(kb.template(TemplateKey::Greeting, Language::En), "Hello! How can I help you today?");
        assert_eq!(kb.template(TemplateKey::Greeting, Language::Es), "¡Hola! ¿Cómo puedo ayudarte hoy?");
    }

    #[test]
    fn missing_key_falls_back_to_default_language_then_fallback() {
        // Sparse store: Spanish has no pricing copy, and neither
        // language has a returns template.
        let mut by_language = HashMap::new();
        by_language.insert(
            Language::En,
            HashMap::from([
                (TemplateKey::Pricing, vec!["en pricing".to_string()]),
                (TemplateKey::Fallback, vec!["en fallback".to_string()]),
            ]),
        );
        by_language.insert(
            Language::Es,
            HashMap::from([(TemplateKey::Fallback, vec!["es fallback".to_string()])]),
        );
        let kb = fixed_kb(0)
            .with_templates(TemplateStore::new(by_language, Language::En));

        assert_eq!(kb.template(TemplateKey::Pricing, Language::Es), "en pricing");
        assert_eq!(kb.template(TemplateKey::Returns, Language::Es), "es fallback");
        assert_eq!(kb.template(TemplateKey::Returns, Language::En), "en fallback");
    }

    #[test]
    fn entity_mentions_resolve_to_catalog_products() {
        let kb = fixed_kb(0);
        let product = kb.product_by_keyword("laptop").expect("mention should resolve");
        assert_eq!(product.name, "Laptop Pro");
    }

    #[test]
    fn faq_search_is_language_aware() {
        let kb = fixed_kb(0);
        let answer = kb.search_faq("shipping time", Language::Es).expect("query should match");
        assert!(answer.starts_with("El envío estándar"));
    }

    #[test]
    fn tone_prefixes_only_exist_for_non_neutral_sentiment() {
        let kb = fixed_kb(0);
        assert!(kb.tone_prefix(Sentiment::Positive, Language::En).is_some());
        assert!(kb.tone_prefix(Sentiment::Negative, Language::Es).is_some());
        assert!(kb.tone_prefix(Sentiment::Neutral, Language::En).is_none());
    }
}
