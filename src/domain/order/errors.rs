use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Order Errors
// ============================================================================
//
// Every use case returns `Result<T, OrderError>`. The kind tells a caller
// which class of failure happened; the code is the machine-readable origin
// (e.g. the store's NOT_FOUND is kept as-is); details carry structured context.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Request failed a precondition before any I/O.
    InvalidInput,
    NotFound,
    /// Requested status equals the current one.
    InvalidStatusChange,
    /// Order store rejected or failed the write/read. Nothing was published.
    PersistenceFailure,
    /// Order was persisted but could not be announced.
    PublicationFailure,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidStatusChange => "INVALID_STATUS_CHANGE",
            ErrorKind::PersistenceFailure => "PERSISTENCE_FAILURE",
            ErrorKind::PublicationFailure => "PUBLICATION_FAILURE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{kind} [{code}]: {message}")]
pub struct OrderError {
    kind: ErrorKind,
    code: String,
    message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    details: BTreeMap<String, Value>,
}

impl OrderError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn invalid_input(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, code, message)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, code, message)
    }

    pub fn invalid_status_change(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidStatusChange, "INVALID_STATUS_CHANGE", message)
    }

    pub fn persistence(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PersistenceFailure, code, message)
    }

    pub fn publication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PublicationFailure, "PUBLICATION_FAILURE", message)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &BTreeMap<String, Value> {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

pub type OrderResult<T> = Result<T, OrderError>;

// ============================================================================
// Pipeline Errors - which orchestrator stage failed
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Persist,
    Publish,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Persist => f.write_str("persist"),
            PipelineStage::Publish => f.write_str("publish"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{stage} stage failed: {error}")]
pub struct PipelineError {
    stage: PipelineStage,
    #[source]
    error: OrderError,
}

impl PipelineError {
    pub fn persist(error: OrderError) -> Self {
        Self { stage: PipelineStage::Persist, error }
    }

    pub fn publish(error: OrderError) -> Self {
        Self { stage: PipelineStage::Publish, error }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn error(&self) -> &OrderError {
        &self.error
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// True when the order reached the store before the failure.
    pub fn is_persisted(&self) -> bool {
        self.stage == PipelineStage::Publish
    }

    pub fn into_inner(self) -> OrderError {
        self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_kind_and_code() {
        let err = OrderError::not_found("NOT_FOUND", "order not found");
        assert_eq!(err.to_string(), "NOT_FOUND [NOT_FOUND]: order not found");
    }

    #[test]
    fn test_error_details() {
        let err = OrderError::invalid_input("INVALID_CLIENT_ID", "bad client")
            .with_detail("clientId", "   ");

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.code(), "INVALID_CLIENT_ID");
        assert_eq!(err.detail("clientId"), Some(&Value::from("   ")));
        assert!(err.detail("orderId").is_none());
    }

    #[test]
    fn test_error_serializes_for_boundary() {
        let err = OrderError::publication("broker down").with_detail("orderId", "abc");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["kind"], "PUBLICATION_FAILURE");
        assert_eq!(json["code"], "PUBLICATION_FAILURE");
        assert_eq!(json["message"], "broker down");
        assert_eq!(json["details"]["orderId"], "abc");
    }

    #[test]
    fn test_pipeline_error_stage() {
        let persisted = PipelineError::publish(OrderError::publication("x"));
        assert!(persisted.is_persisted());
        assert_eq!(persisted.kind(), ErrorKind::PublicationFailure);

        let not_persisted = PipelineError::persist(OrderError::persistence("STORE_FAILED", "x"));
        assert!(!not_persisted.is_persisted());
        assert_eq!(not_persisted.stage(), PipelineStage::Persist);
        assert_eq!(not_persisted.into_inner().code(), "STORE_FAILED");
    }
}
