use thiserror::Error;

/// Errors surfaced by the pure builder/canonicalization layer (C1/C2).
///
/// These are programmer-error contract violations per spec §7: "the only
/// exceptions are programmer-error contract violations at construction
/// time ... which may fail loudly." Everything downstream of construction
/// (I/O, session lookups) swallows its own errors at the public boundary
/// instead of returning one of these.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("reasoning entry requires non-empty text or an external blob path")]
    EmptyReasoning,

    #[error("failed to canonicalize manifest entry: {0}")]
    Canonicalize(#[from] serde_json::Error),

    #[error("failed to gzip-compress reasoning text: {0}")]
    Compress(#[source] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn core_error_is_send_sync() {
        assert_send_sync::<CoreError>();
    }

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            CoreError::EmptyReasoning.to_string(),
            "reasoning entry requires non-empty text or an external blob path"
        );
    }
}
