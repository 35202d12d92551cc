use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Languages the pipeline can detect and answer in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Es,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language code `{0}` (expected en|es)")]
pub struct UnknownLanguage(pub String);

/// Sentiment label derived from a polarity score by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

/// Closed catalog of message intents.
///
/// Declaration order doubles as classification priority: when two intents
/// tie on score, the one declared earlier wins. `Unknown` is a first-class
/// variant covering empty input, zero keyword hits, and the low-confidence
/// route; it is never produced by a missing lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    ProductInfo,
    Pricing,
    Shipping,
    Returns,
    TechnicalSupport,
    OrderStatus,
    Account,
    Unknown,
}

impl Intent {
    /// The classifiable intents, in tie-break priority order.
    pub const CATALOG: [Intent; 8] = [
        Intent::Greeting,
        Intent::ProductInfo,
        Intent::Pricing,
        Intent::Shipping,
        Intent::Returns,
        Intent::TechnicalSupport,
        Intent::OrderStatus,
        Intent::Account,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::ProductInfo => "product_info",
            Intent::Pricing => "pricing",
            Intent::Shipping => "shipping",
            Intent::Returns => "returns",
            Intent::TechnicalSupport => "technical_support",
            Intent::OrderStatus => "order_status",
            Intent::Account => "account",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw sentiment signal produced by the NLP pipeline.
///
/// Polarity stays within `[-1.0, 1.0]`; turning it into a
/// positive/neutral/negative label is the dispatcher's job.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub polarity: f64,
}

/// Structured facts pulled out of the message text.
///
/// Always present on an [`NlpResult`], possibly empty. Ordered sets keep
/// downstream output deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub order_numbers: BTreeSet<String>,
    #[serde(default)]
    pub product_mentions: BTreeSet<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.order_numbers.is_empty() && self.product_mentions.is_empty()
    }

    /// First order number in deterministic (sorted) order, if any.
    pub fn first_order_number(&self) -> Option<&str> {
        self.order_numbers.iter().next().map(String::as_str)
    }
}

/// Everything the pipeline derived from one message. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NlpResult {
    pub original_text: String,
    pub language: Language,
    pub tokens: Vec<String>,
    pub intent: Intent,
    pub intent_confidence: f64,
    pub sentiment: SentimentScore,
    pub entities: Entities,
}

/// One logged exchange in the conversation store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub message: String,
    pub nlp_result: NlpResult,
}

/// The reply returned to the caller.
///
/// `intent` is the wire label: one of the catalog labels, `"unknown"`, or
/// `"error"` for the generic failure envelope. The `sentiment` is the
/// post-adjustment label, not the raw polarity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub text: String,
    pub intent: String,
    pub confidence: f64,
    pub language: Language,
    pub sentiment: Sentiment,
    pub entities: Entities,
    pub timestamp: DateTime<Utc>,
}
