use thiserror::Error;

use crate::gateway::ApiService;

/// Errors surfaced to callers of the chat entry points.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("request is missing the message text")]
    MissingMessage,
}

impl RequestError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingMessage => "Message is required",
        }
    }
}

/// Errors that escape an intent handler and trip the dispatcher's
/// error boundary. API failures are handled inside each handler and
/// never reach this type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("malformed {service} record: missing field `{field}`")]
    MalformedRecord { service: ApiService, field: &'static str },
}

#[cfg(test)]
mod tests {
    use crate::gateway::ApiService;

    use super::{HandlerError, RequestError};

    #[test]
    fn missing_message_has_user_safe_text() {
        assert_eq!(RequestError::MissingMessage.user_message(), "Message is required");
    }

    #[test]
    fn malformed_record_names_service_and_field() {
        let error = HandlerError::MalformedRecord { service: ApiService::Order, field: "status" };
        assert_eq!(error.to_string(), "malformed order record: missing field `status`");
    }
}
