//! Provider types

use std::fmt;

/// Errors that can occur while retrieving tile bytes from a map server.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed or returned a non-success status
    HttpError(String),
    /// Base address or substituted tile path did not form a valid URL
    InvalidUrl(String),
    /// Response body could not be decoded as an image
    InvalidResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        assert_eq!(
            ProviderError::HttpError("HTTP 404".to_string()).to_string(),
            "HTTP error: HTTP 404"
        );
        assert_eq!(
            ProviderError::InvalidUrl("relative URL without a base".to_string()).to_string(),
            "Invalid URL: relative URL without a base"
        );
        assert_eq!(
            ProviderError::InvalidResponse("truncated PNG".to_string()).to_string(),
            "Invalid response: truncated PNG"
        );
    }
}
