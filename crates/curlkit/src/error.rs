//! Error types for curlkit

use crate::types::RequestDescriptor;
use thiserror::Error;

/// Errors raised while splitting a command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A quote character has no closing partner
    #[error("Unmatched quote: {line}")]
    MalformedQuoting {
        /// The full input line, for diagnostics
        line: String,
    },
}

/// Errors that can occur while executing a request descriptor
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Descriptor has no URL
    #[error("No URL provided in curl command")]
    MissingUrl,

    /// Method is not a valid HTTP token
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// Header name or value cannot be sent
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Response claimed JSON but the body did not parse
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),
}

impl ExecuteError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExecuteError::Timeout
        } else if err.is_connect() {
            ExecuteError::ConnectError(err)
        } else {
            ExecuteError::RequestError(err.to_string())
        }
    }
}

/// Errors surfaced by the gateway while handling a command
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Decoded command exceeds the configured limit
    #[error("Command too long")]
    CommandTooLong,

    /// Path is not valid percent-encoded UTF-8
    #[error("URI malformed")]
    MalformedUri,

    /// Line does not start with the curl command name
    #[error("Invalid curl command")]
    NotACommand,

    /// Command line could not be split
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Target URL rejected by the filter
    #[error("URL not allowed for security reasons")]
    BlockedUrl,

    /// Request was parsed but execution failed
    #[error("{source}")]
    Execute {
        /// Descriptor that failed, echoed back to the caller
        parsed: RequestDescriptor,
        #[source]
        source: ExecuteError,
    },
}

impl GatewayError {
    /// HTTP status code used when reporting this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::CommandTooLong | GatewayError::NotACommand => 400,
            GatewayError::MalformedUri | GatewayError::Parse(_) => 500,
            GatewayError::BlockedUrl => 403,
            GatewayError::Execute {
                source: ExecuteError::MissingUrl,
                ..
            } => 400,
            GatewayError::Execute { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::MalformedQuoting {
                line: "curl 'x".to_string()
            }
            .to_string(),
            "Unmatched quote: curl 'x"
        );
        assert_eq!(
            ExecuteError::MissingUrl.to_string(),
            "No URL provided in curl command"
        );
        assert_eq!(
            ExecuteError::InvalidMethod("G T".to_string()).to_string(),
            "Invalid method: G T"
        );
        assert_eq!(
            GatewayError::BlockedUrl.to_string(),
            "URL not allowed for security reasons"
        );
        assert_eq!(
            GatewayError::NotACommand.to_string(),
            "Invalid curl command"
        );
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err: GatewayError = ParseError::MalformedQuoting {
            line: "curl \"a".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Unmatched quote: curl \"a");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::CommandTooLong.status_code(), 400);
        assert_eq!(GatewayError::NotACommand.status_code(), 400);
        assert_eq!(GatewayError::BlockedUrl.status_code(), 403);

        let missing = GatewayError::Execute {
            parsed: RequestDescriptor::default(),
            source: ExecuteError::MissingUrl,
        };
        assert_eq!(missing.status_code(), 400);
        assert_eq!(missing.to_string(), "No URL provided in curl command");

        let failed = GatewayError::Execute {
            parsed: RequestDescriptor::default(),
            source: ExecuteError::Timeout,
        };
        assert_eq!(failed.status_code(), 500);
    }
}
