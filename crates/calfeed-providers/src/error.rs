//! Error types for calendar provider operations.

use std::fmt;

use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Missing or invalid provider credential; no call was attempted.
    Credential,
    /// Network error - connection failed, timeout, DNS resolution.
    Network,
    /// The provider returned a non-success response.
    Request,
    /// A success response was missing required fields or unparsable.
    MalformedResponse,
}

impl ProviderErrorCode {
    /// Returns true if this error is transient and the fetch may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Returns a stable machine-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credential => "credential_error",
            Self::Network => "network_error",
            Self::Request => "request_failed",
            Self::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while fetching a calendar feed.
#[derive(Debug, Error)]
pub struct ProviderError {
    /// The error code categorizing this error.
    code: ProviderErrorCode,
    /// Provider-supplied or client-generated message text.
    message: String,
    /// The underlying cause, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a credential error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Credential, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Network, message)
    }

    /// Creates a request error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Request, message)
    }

    /// Creates a malformed response error.
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::MalformedResponse, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
