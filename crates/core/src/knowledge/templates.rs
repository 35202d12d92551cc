use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Intent, Language, Sentiment};

/// Lookup key into the response template store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    Greeting,
    ProductInfo,
    Pricing,
    Shipping,
    Returns,
    TechnicalSupport,
    Fallback,
    PositiveTone,
    NegativeTone,
}

impl TemplateKey {
    /// Template used when a handler has nothing better to say for its
    /// intent. Order status and account answers are always composed
    /// from backend data, so they carry no template.
    pub fn for_intent(intent: Intent) -> Option<Self> {
        match intent {
            Intent::Greeting => Some(Self::Greeting),
            Intent::ProductInfo => Some(Self::ProductInfo),
            Intent::Pricing => Some(Self::Pricing),
            Intent::Shipping => Some(Self::Shipping),
            Intent::Returns => Some(Self::Returns),
            Intent::TechnicalSupport => Some(Self::TechnicalSupport),
            Intent::OrderStatus | Intent::Account => None,
            Intent::Unknown => Some(Self::Fallback),
        }
    }
}

/// Chooses one variant out of `variant_count` equally good phrasings.
pub trait VariantSelector: Send + Sync {
    fn pick(&self, variant_count: usize) -> usize;
}

/// Production selector backed by the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomSelector;

impl VariantSelector for RandomSelector {
    fn pick(&self, variant_count: usize) -> usize {
        if variant_count <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..variant_count)
    }
}

/// Deterministic selector seeded once, for reproducible transcripts.
pub struct SeededSelector {
    rng: Mutex<StdRng>,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl VariantSelector for SeededSelector {
    fn pick(&self, variant_count: usize) -> usize {
        if variant_count <= 1 {
            return 0;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..variant_count)
    }
}

/// Always picks the same slot; test selector.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedSelector(pub usize);

impl VariantSelector for FixedSelector {
    fn pick(&self, variant_count: usize) -> usize {
        if variant_count == 0 {
            return 0;
        }
        self.0 % variant_count
    }
}

const LAST_RESORT: &str = "I'm not sure I understand. Could you please rephrase your question?";

/// Canned response variants, keyed first by language and then by
/// template. Lookups that miss fall back to the default language and
/// finally to the fallback template, so rendering is total.
pub struct TemplateStore {
    templates: HashMap<Language, HashMap<TemplateKey, Vec<String>>>,
    default_language: Language,
}

impl TemplateStore {
    pub fn new(
        templates: HashMap<Language, HashMap<TemplateKey, Vec<String>>>,
        default_language: Language,
    ) -> Self {
        Self { templates, default_language }
    }

    pub fn with_builtin_responses(default_language: Language) -> Self {
        let mut templates: HashMap<Language, HashMap<TemplateKey, Vec<String>>> = HashMap::new();

        let en = templates.entry(Language::En).or_default();
        insert(en, TemplateKey::Greeting, &[
            "Hello! How can I help you today?",
            "Hi there! What can I assist you with?",
            "Welcome! How may I help you?",
        ]);
        insert(en, TemplateKey::ProductInfo, &[
            "I'd be happy to help you with product information. Could you please specify which product you're interested in?",
            "Let me help you find the product details you need. What product are you looking for?",
        ]);
        insert(en, TemplateKey::Pricing, &[
            "I can help you with pricing information. Which product or service are you interested in?",
            "Let me get you the latest pricing details. What would you like to know about?",
        ]);
        insert(en, TemplateKey::Shipping, &[
            "I can help you with shipping information. Do you have an order number or would you like general shipping details?",
            "Let me assist you with shipping. Are you asking about a specific order or general shipping policies?",
        ]);
        insert(en, TemplateKey::Returns, &[
            "I can help you with returns and refunds. Do you have an order number you'd like to return?",
            "Let me assist you with your return. Could you provide your order details?",
        ]);
        insert(en, TemplateKey::TechnicalSupport, &[
            "I'm here to help with technical issues. Could you describe the problem you're experiencing?",
            "Let me help you resolve this technical issue. What specific problem are you facing?",
        ]);
        insert(en, TemplateKey::Fallback, &[
            "I'm not sure I understand. Could you please rephrase your question?",
            "I'd like to help, but I need more information. Could you be more specific?",
            "I'm having trouble understanding your request. Could you try asking in a different way?",
        ]);
        insert(en, TemplateKey::PositiveTone, &[
            "I'm glad to help! ",
            "Great! ",
            "Wonderful! ",
        ]);
        insert(en, TemplateKey::NegativeTone, &[
            "I understand your frustration. Let me help resolve this for you. ",
            "I'm sorry you're experiencing this issue. I'll do my best to help. ",
            "I apologize for any inconvenience. Let me assist you. ",
        ]);

        let es = templates.entry(Language::Es).or_default();
        insert(es, TemplateKey::Greeting, &[
            "¡Hola! ¿Cómo puedo ayudarte hoy?",
            "¡Hola! ¿En qué puedo asistirte?",
            "¡Bienvenido! ¿Cómo puedo ayudarte?",
        ]);
        insert(es, TemplateKey::ProductInfo, &[
            "Me complace ayudarte con información del producto. ¿Podrías especificar qué producto te interesa?",
            "Permíteme ayudarte a encontrar los detalles del producto que necesitas. ¿Qué producto buscas?",
        ]);
        insert(es, TemplateKey::Pricing, &[
            "Puedo ayudarte con información de precios. ¿Qué producto o servicio te interesa?",
            "Permíteme obtener los detalles de precios más recientes. ¿Qué te gustaría saber?",
        ]);
        insert(es, TemplateKey::Shipping, &[
            "Puedo ayudarte con información de envío. ¿Tienes un número de pedido o quieres detalles generales de envío?",
            "Permíteme asistirte con el envío. ¿Preguntas sobre un pedido específico o políticas generales de envío?",
        ]);
        insert(es, TemplateKey::Returns, &[
            "Puedo ayudarte con devoluciones y reembolsos. ¿Tienes un número de pedido que quieres devolver?",
            "Permíteme asistirte con tu devolución. ¿Podrías proporcionar los detalles de tu pedido?",
        ]);
        insert(es, TemplateKey::TechnicalSupport, &[
            "Estoy aquí para ayudar con problemas técnicos. ¿Podrías describir el problema que experimentas?",
            "Permíteme ayudarte a resolver este problema técnico. ¿Qué problema específico enfrentas?",
        ]);
        insert(es, TemplateKey::Fallback, &[
            "No estoy seguro de entender. ¿Podrías reformular tu pregunta?",
            "Me gustaría ayudar, pero necesito más información. ¿Podrías ser más específico?",
            "Tengo problemas para entender tu solicitud. ¿Podrías intentar preguntar de otra manera?",
        ]);
        insert(es, TemplateKey::PositiveTone, &[
            "¡Me alegra ayudar! ",
            "¡Excelente! ",
            "¡Maravilloso! ",
        ]);
        insert(es, TemplateKey::NegativeTone, &[
            "Entiendo tu frustración. Permíteme ayudarte a resolver esto. ",
            "Lamento que experimentes este problema. Haré mi mejor esfuerzo para ayudar. ",
            "Me disculpo por cualquier inconveniente. Permíteme asistirte. ",
        ]);

        Self { templates, default_language }
    }

    fn variants(&self, language: Language, key: TemplateKey) -> Option<&[String]> {
        self.templates
            .get(&language)
            .and_then(|by_key| by_key.get(&key))
            .map(Vec::as_slice)
            .filter(|variants| !variants.is_empty())
    }

    fn resolve(&self, language: Language, key: TemplateKey) -> Option<&[String]> {
        self.variants(language, key)
            .or_else(|| self.variants(self.default_language, key))
            .or_else(|| self.variants(language, TemplateKey::Fallback))
            .or_else(|| self.variants(self.default_language, TemplateKey::Fallback))
    }

    /// Renders one variant for the key, falling back through the
    /// default language and the fallback template before giving up on
    /// a hardcoded last resort.
    pub fn render(
        &self,
        language: Language,
        key: TemplateKey,
        selector: &dyn VariantSelector,
    ) -> String {
        match self.resolve(language, key) {
            Some(variants) => variants[selector.pick(variants.len()) % variants.len()].clone(),
            None => LAST_RESORT.to_string(),
        }
    }

    /// Tone prefixes do not cascade into the fallback template; a
    /// missing prefix simply leaves the response unchanged.
    pub fn tone_prefix(
        &self,
        language: Language,
        sentiment: Sentiment,
        selector: &dyn VariantSelector,
    ) -> Option<String> {
        let key = match sentiment {
            Sentiment::Positive => TemplateKey::PositiveTone,
            Sentiment::Negative => TemplateKey::NegativeTone,
            Sentiment::Neutral => return None,
        };

        self.variants(language, key)
            .or_else(|| self.variants(self.default_language, key))
            .map(|variants| variants[selector.pick(variants.len()) % variants.len()].clone())
    }
}

fn insert(
    by_key: &mut HashMap<TemplateKey, Vec<String>>,
    key: TemplateKey,
    variants: &[&str],
) {
    by_key.insert(key, variants.iter().map(|variant| (*variant).to_string()).collect());
}
