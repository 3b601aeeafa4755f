use super::types::VigilError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl VigilError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Transient feed/network failures are retried at the client boundary
            VigilError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            VigilError::RateLimit(_) => ErrorClassification {
                error_type: "RateLimitError",
                retryable: true,
            },
            VigilError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                retryable: true,
            },

            // A model outage is never retried; the analyzer cascade absorbs it
            VigilError::ModelUnavailable(_) => ErrorClassification {
                error_type: "ModelUnavailableError",
                retryable: false,
            },

            // Terminal errors
            VigilError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            VigilError::FeedFormat(_) => ErrorClassification {
                error_type: "FeedFormatError",
                retryable: false,
            },
            VigilError::Validation(_) => ErrorClassification {
                error_type: "ValidationError",
                retryable: false,
            },
            VigilError::Precondition(_) => ErrorClassification {
                error_type: "PreconditionError",
                retryable: false,
            },
            VigilError::Database(_) => ErrorClassification {
                error_type: "DatabaseError",
                retryable: false,
            },
            VigilError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: false,
            },
            VigilError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            VigilError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            VigilError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: false,
            },
        }
    }
}
