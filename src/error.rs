pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// A human-readable message reported by the transaction service itself, either as an `error`
/// field in a successful response or as an `error`/`detail` field in a failed one.
///
/// Read failures carrying a `ServiceError` show its message to the user, other failures (network,
/// decoding) fall back to a fixed message for the read.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Returns the service-reported message found anywhere in the chain of `e`, if any.
pub(crate) fn service_message(e: &Error) -> Option<&str> {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<ServiceError>())
        .map(ServiceError::message)
}
