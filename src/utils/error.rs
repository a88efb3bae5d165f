use thiserror::Error;

/// Every failure surfaced by the client. There is no internal retry: each
/// variant reaches the caller as soon as it happens.
#[derive(Error, Debug)]
pub enum SocProofError {
    /// Non-success HTTP status, or `status == -1` for transport failures.
    #[error("HTTP {status}: {message}")]
    HttpRequest { status: i32, message: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("API rejected the request: {0}")]
    Api(String),

    #[error("Service ID {0} not found")]
    ServiceNotFound(u32),

    #[error("Description for service ID {0} not found")]
    DescriptionNotFound(u32),

    #[error("No order ID returned for service {service}")]
    OrderNotFound { service: u32 },

    #[error("Order {order_id} missing fields: {}", missing_fields.join(", "))]
    OrderStatus {
        order_id: String,
        missing_fields: Vec<String>,
    },

    #[error("Failed to parse field '{field}': {reason}")]
    Parse { field: String, reason: String },

    #[error("Table '{table}' not found on the catalog page")]
    CatalogTableNotFound { table: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidArgument {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),
}

impl SocProofError {
    pub fn parse(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP status carried by an `HttpRequest` error.
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::HttpRequest { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::HttpRequest { status: -1, .. } => "Check network connectivity and try again",
            Self::HttpRequest { status, .. } if (500..600).contains(status) => {
                "The service is having trouble, try again later"
            }
            Self::HttpRequest { .. } | Self::Api(_) => "Check the API token and request parameters",
            Self::InvalidResponse(_) | Self::Parse { .. } | Self::CatalogTableNotFound { .. } => {
                "The upstream format may have changed, update the client"
            }
            Self::ServiceNotFound(_) | Self::DescriptionNotFound(_) => {
                "List services to find a valid service ID"
            }
            Self::OrderNotFound { .. } | Self::OrderStatus { .. } => {
                "Check the order in the soc-proof dashboard"
            }
            Self::InvalidArgument { .. } | Self::Config { .. } => {
                "Fix the configuration or arguments and retry"
            }
            Self::Io(_) | Self::Serialization(_) | Self::Csv(_) => {
                "Check the output path and permissions"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SocProofError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_message_lists_missing_fields() {
        let err = SocProofError::OrderStatus {
            order_id: "42".to_string(),
            missing_fields: vec!["charge".to_string(), "remains".to_string()],
        };
        assert_eq!(err.to_string(), "Order 42 missing fields: charge, remains");
    }

    #[test]
    fn test_status_only_for_http_errors() {
        let http = SocProofError::HttpRequest {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(http.status(), Some(503));
        assert_eq!(http.to_string(), "HTTP 503: unavailable");
        assert_eq!(SocProofError::ServiceNotFound(1).status(), None);
    }

    #[test]
    fn test_recovery_suggestion_for_transport_failure() {
        let err = SocProofError::HttpRequest {
            status: -1,
            message: "connection refused".to_string(),
        };
        assert!(err.recovery_suggestion().contains("network"));
    }
}
