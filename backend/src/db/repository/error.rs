//! Error types for record-store operations.
//!
//! Every failure surfaced by a store carries an [`ErrorContext`] describing
//! the operation, the collection and (for point lookups) the record involved.
//! A record that does not exist is not an error: lookups return `Ok(None)`.

use std::fmt;

/// Boxed underlying cause (transport, decoding, ...).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for store operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Structured context for store errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "fetch_all", "fetch_one_by_id")
    pub operation: Option<String>,
    /// Collection (table) identifier
    pub collection: Option<String>,
    /// Record identifier if applicable
    pub record_id: Option<String>,
    /// HTTP status reported by the backend, when there was one
    pub status: Option<u16>,
    /// Additional details about the error
    pub details: Option<String>,
    /// Whether this error is retryable
    pub retryable: bool,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_record_id(mut self, id: impl ToString) -> Self {
        self.record_id = Some(id.to_string());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref collection) = self.collection {
            parts.push(format!("collection={}", collection));
        }
        if let Some(ref id) = self.record_id {
            parts.push(format!("id={}", id));
        }
        if let Some(status) = self.status {
            parts.push(format!("status={}", status));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for record-store operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The backend could not be reached or the connection dropped.
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
        #[source]
        source: Option<BoxError>,
    },

    /// The backend answered with a failure status (bad filter, auth, rate limit, ...).
    #[error("Query error: {message} {context}")]
    QueryError {
        message: String,
        context: ErrorContext,
    },

    /// The backend answered but the payload could not be understood.
    #[error("Decode error: {message} {context}")]
    DecodeError {
        message: String,
        context: ErrorContext,
        #[source]
        source: Option<BoxError>,
    },

    /// Missing or invalid configuration. Raised while constructing a store.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// The request exceeded the configured timeout.
    #[error("Timeout error: {message} {context}")]
    TimeoutError {
        message: String,
        context: ErrorContext,
        #[source]
        source: Option<BoxError>,
    },

    /// A caller-supplied value cannot be expressed in the store's query language.
    #[error("Invalid input: {message} {context}")]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: ErrorContext::default().retryable(),
            source: None,
        }
    }

    /// Create a connection error with full context and cause.
    pub fn connection_with_source(
        message: impl Into<String>,
        context: ErrorContext,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: context.retryable(),
            source: Some(source.into()),
        }
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a query error with context.
    pub fn query_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::QueryError {
            message: message.into(),
            context,
        }
    }

    /// Create a decode error with context and cause.
    pub fn decode_with_source(
        message: impl Into<String>,
        context: ErrorContext,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::DecodeError {
            message: message.into(),
            context,
            source: Some(source.into()),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a timeout error with context and cause.
    pub fn timeout_with_source(
        message: impl Into<String>,
        context: ErrorContext,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::TimeoutError {
            message: message.into(),
            context: context.retryable(),
            source: Some(source.into()),
        }
    }

    /// Create an invalid-input error with context.
    pub fn invalid_input(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InvalidInput {
            message: message.into(),
            context,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }

    /// Configuration errors are fatal at start-up; everything else is a backend failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError { .. })
    }

    /// The request itself was unusable; nothing was sent to the backend.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::DecodeError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::TimeoutError { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::DecodeError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::TimeoutError { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add or update the collection in the error context.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.context_mut().collection = Some(collection.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("fetch_all")
            .with_collection("Books")
            .with_status(503)
            .retryable();
        let text = ctx.to_string();
        assert!(text.contains("operation=fetch_all"));
        assert!(text.contains("collection=Books"));
        assert!(text.contains("status=503"));
        assert!(text.contains("retryable=true"));
    }

    #[test]
    fn test_connection_error_is_retryable() {
        let err = RepositoryError::connection("store unreachable");
        assert!(err.is_retryable());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_configuration_error_is_not_retryable() {
        let err = RepositoryError::configuration("DATABASE_API_KEY not set");
        assert!(!err.is_retryable());
        assert!(err.is_configuration());
        assert!(err.to_string().contains("DATABASE_API_KEY"));
    }

    #[test]
    fn test_with_operation_and_collection() {
        let err = RepositoryError::query("bad formula")
            .with_operation("fetch_all")
            .with_collection("Invoices");
        assert_eq!(err.context().operation.as_deref(), Some("fetch_all"));
        assert_eq!(err.context().collection.as_deref(), Some("Invoices"));
    }

    #[test]
    fn test_invalid_input_is_not_retryable() {
        let err = RepositoryError::invalid_input(
            "reserved character",
            ErrorContext::new("render_filter").with_details("Client Email"),
        );
        assert!(err.is_invalid_input());
        assert!(!err.is_retryable());
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("details=Client Email"));
    }

    #[test]
    fn test_source_is_preserved() {
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = RepositoryError::connection_with_source(
            "page request failed",
            ErrorContext::new("fetch_all"),
            cause,
        );
        let source = err.source().expect("cause kept");
        assert!(source.to_string().contains("reset by peer"));
    }
}
