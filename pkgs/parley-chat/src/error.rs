use thiserror::Error;

use parley_store::StoreError;

/// Errors surfaced at the service boundary.
///
/// Push delivery has no variant here on purpose: by the time a message is
/// published it is already durable, so a failed push is logged inside the
/// delivery hub and never reaches the sender.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid request: {0}")]
    Validation(#[source] StoreError),

    #[error("storage failure: {0}")]
    Persistence(#[source] StoreError),

    #[error("not authenticated")]
    Unauthenticated,
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        if err.is_validation() {
            ChatError::Validation(err)
        } else {
            ChatError::Persistence(err)
        }
    }
}
