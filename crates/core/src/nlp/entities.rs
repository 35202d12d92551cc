use crate::domain::Entities;

/// Surface forms mapped to the canonical mention recorded in
/// [`Entities::product_mentions`].
const PRODUCT_VOCABULARY: &[(&str, &str)] = &[
    ("laptop", "laptop"),
    ("laptops", "laptop"),
    ("computer", "laptop"),
    ("portatil", "laptop"),
    ("portátil", "laptop"),
    ("computadora", "laptop"),
    ("smartphone", "smartphone"),
    ("smartphones", "smartphone"),
    ("phone", "smartphone"),
    ("telefono", "smartphone"),
    ("teléfono", "smartphone"),
    ("movil", "smartphone"),
    ("móvil", "smartphone"),
    ("headphones", "headphones"),
    ("auriculares", "headphones"),
    ("audifonos", "headphones"),
    ("audífonos", "headphones"),
];

/// Pulls order numbers and product mentions out of the token stream.
/// Both sets are always present on the result, empty or not.
#[derive(Clone, Debug, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, tokens: &[String]) -> Entities {
        let mut entities = Entities::default();

        for token in tokens {
            if let Some(order_number) = parse_order_number(token) {
                entities.order_numbers.insert(order_number);
            }
            if let Some((_, canonical)) =
                PRODUCT_VOCABULARY.iter().find(|(surface, _)| surface == token)
            {
                entities.product_mentions.insert((*canonical).to_string());
            }
        }

        entities
    }
}

/// An order number is `ORD` followed by at least three digits. Tokens
/// arrive lowercased; the stored form is uppercased back.
fn parse_order_number(token: &str) -> Option<String> {
    let digits = token.strip_prefix("ord")?;
    if digits.len() >= 3 && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(token.to_ascii_uppercase())
    } else {
        None
    }
}
