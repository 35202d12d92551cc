pub mod chatbot;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod history;
pub mod knowledge;
pub mod nlp;

pub use chatbot::{ChatRequest, Chatbot};
pub use config::{BotConfig, ConfigError, LoadOptions, LogFormat};
pub use dispatch::{Dispatcher, HandlerContext, IntentHandler};
pub use domain::{
    ConversationEntry, Entities, Intent, Language, NlpResult, ResponseEnvelope, Sentiment,
    SentimentScore,
};
pub use errors::{HandlerError, RequestError};
pub use gateway::{
    ApiError, ApiErrorKind, ApiGateway, ApiService, DemoApiGateway, ScriptedGateway,
    TimeoutApiGateway,
};
pub use history::ConversationStore;
pub use knowledge::{
    FixedSelector, KnowledgeBase, Product, ProductId, RandomSelector, SeededSelector,
    TemplateKey, VariantSelector,
};
pub use nlp::NlpPipeline;
