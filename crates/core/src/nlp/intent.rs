use crate::domain::Intent;

/// Function words ignored during scoring, covering both supported
/// languages. Tokens surviving this filter are the "content" words a
/// lexicon match is measured against.
const STOPWORDS: &[&str] = &[
    // English
    "a", "an", "the", "and", "or", "but", "if", "of", "at", "by", "for", "with", "about", "to",
    "from", "in", "on", "off", "out", "up", "down", "over", "under", "again", "is", "am", "are",
    "was", "were", "be", "been", "being", "do", "does", "did", "doing", "have", "has", "had",
    "having", "i", "me", "my", "we", "our", "you", "your", "he", "she", "it", "its", "they",
    "them", "their", "this", "that", "these", "those", "what", "which", "who", "when", "where",
    "why", "how", "all", "any", "some", "such", "no", "not", "only", "so", "than", "too", "very",
    "can", "will", "would", "should", "could", "just", "please", "want", "need", "there", "here",
    "then",
    // Spanish
    "de", "del", "la", "las", "el", "los", "un", "una", "unos", "unas", "y", "o", "al", "en",
    "es", "son", "esta", "está", "estan", "están", "estoy", "ser", "que", "qué", "como", "cómo",
    "cuando", "cuándo", "donde", "dónde", "cual", "cuál", "con", "sin", "por", "para", "favor",
    "si", "sí", "mi", "mis", "tu", "tus", "su", "sus", "te", "se", "lo", "le", "les", "ya",
    "muy", "mas", "más", "pero", "porque", "sobre", "también", "hasta", "hay", "yo", "quiero",
    "necesito", "puedo", "puede", "tengo", "tiene",
];

/// Keyword lexicon per intent. Listed in the same order as
/// [`Intent::CATALOG`] so equal scores resolve to the earlier entry.
const LEXICONS: &[(Intent, &[&str])] = &[
    (
        Intent::Greeting,
        &[
            "hello", "hi", "hey", "greetings", "howdy", "morning", "afternoon", "evening",
            "good", "welcome", "hola", "buenos", "buenas", "saludos", "bienvenido",
        ],
    ),
    (
        Intent::ProductInfo,
        &[
            "product", "products", "item", "items", "specs", "specifications", "details",
            "feature", "features", "information", "laptop", "smartphone", "phone", "headphones",
            "producto", "productos", "detalles", "caracteristicas", "características",
            "informacion", "información",
        ],
    ),
    (
        Intent::Pricing,
        &[
            "price", "prices", "pricing", "cost", "costs", "much", "expensive", "cheap",
            "discount", "laptop", "smartphone", "phone", "headphones", "precio", "precios",
            "costo", "cuesta", "vale", "cuanto", "cuánto", "barato", "caro", "descuento",
        ],
    ),
    (
        Intent::Shipping,
        &[
            "shipping", "ship", "shipped", "delivery", "deliver", "delivered", "tracking",
            "track", "order", "package", "envio", "envío", "enviado", "entrega", "paquete",
            "pedido", "seguimiento",
        ],
    ),
    (
        Intent::Returns,
        &[
            "return", "returns", "refund", "refunds", "exchange", "devolver", "devolucion",
            "devolución", "reembolso", "cambiar",
        ],
    ),
    (
        Intent::TechnicalSupport,
        &[
            "technical", "support", "issue", "problem", "error", "broken", "fix", "crash",
            "crashing", "crashes", "bug", "help", "device", "working", "soporte", "tecnico",
            "técnico", "problema", "ayuda", "falla", "arreglar", "funciona", "roto",
        ],
    ),
    (
        Intent::OrderStatus,
        &[
            "order", "orders", "status", "orden", "pedido", "pedidos", "estado",
        ],
    ),
    (
        Intent::Account,
        &[
            "account", "accounts", "profile", "login", "membership", "email", "password",
            "subscription", "cuenta", "perfil", "membresia", "membresía", "correo",
            "contraseña", "contrasena", "suscripcion", "suscripción",
        ],
    ),
];

/// Scores each intent lexicon against the message's content words.
///
/// The score is the fraction of content words matched by the lexicon,
/// so a short on-topic message scores high and an off-topic one scores
/// zero. The best score is returned clamped to `0.0..=1.0`; a message
/// with no lexicon hits at all classifies as [`Intent::Unknown`].
#[derive(Clone, Debug, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, tokens: &[String]) -> (Intent, f64) {
        let content_words = tokens
            .iter()
            .map(String::as_str)
            .filter(|token| !is_stopword(token))
            .collect::<Vec<_>>();

        if content_words.is_empty() {
            return (Intent::Unknown, 0.0);
        }

        let mut best_intent = Intent::Unknown;
        let mut best_score = 0.0f64;

        for (intent, lexicon) in LEXICONS {
            let matched =
                content_words.iter().filter(|token| lexicon.contains(*token)).count();
            let score = matched as f64 / content_words.len() as f64;
            if score > best_score {
                best_intent = *intent;
                best_score = score;
            }
        }

        (best_intent, best_score.clamp(0.0, 1.0))
    }
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}
