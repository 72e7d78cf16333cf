use crate::store::{ArtHandle, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// A drawing call that needs a current contour or point was made without one.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("index {index} is out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
    /// The item was removed from its document, or the id belongs to a reused slot.
    #[error("item is detached from its document")]
    Detached,
    #[error("item is not a {expected}")]
    WrongItemKind { expected: &'static str },
    #[error("backing store rejected the operation on {handle:?}")]
    SyncFailure {
        handle: ArtHandle,
        #[source]
        source: StoreError,
    },
    #[error("commit requested while another commit is in progress")]
    ReentrantCommit,
}

impl PathError {
    pub(crate) fn sync(handle: ArtHandle) -> impl FnOnce(StoreError) -> PathError {
        move |source| PathError::SyncFailure { handle, source }
    }
}

pub type Result<T, E = PathError> = std::result::Result<T, E>;
