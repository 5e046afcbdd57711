/// Errors returned by a [`StateProvider`](crate::provider::StateProvider).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Network-level failure (connection refused, DNS, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered, but not with something we understand.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Errors returned by an [`AlertSink`](crate::alert::AlertSink).
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Alert transport error: {0}")]
    Transport(String),

    #[error("Alert rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Entity resolution failed before any entity could be determined.
#[derive(Debug, thiserror::Error)]
#[error("Failed to resolve entities: {0}")]
pub struct ResolutionError(#[from] pub ProviderError);

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("max_concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_found() {
        let err = ProviderError::NotFound("person.alice".to_string());
        assert_eq!(err.to_string(), "Entity not found: person.alice");
    }

    #[test]
    fn display_rejected() {
        let err = DeliveryError::Rejected {
            status: 400,
            body: "chat not found".to_string(),
        };
        assert_eq!(err.to_string(), "Alert rejected (400): chat not found");
    }

    #[test]
    fn resolution_error_wraps_provider_error() {
        let err: ResolutionError = ProviderError::Transport("connection refused".into()).into();
        assert_eq!(
            err.to_string(),
            "Failed to resolve entities: Transport error: connection refused"
        );
    }

    #[test]
    fn display_invalid_concurrency() {
        assert_eq!(
            ScanError::InvalidConcurrency(0).to_string(),
            "max_concurrency must be at least 1, got 0"
        );
    }
}
