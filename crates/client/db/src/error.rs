/// Errors crossing the storage boundary.
///
/// Store-level faults propagate unchanged; the adapter never masks or
/// retries. `NotFound` is a distinguished result, not a fault: a natural-key
/// anchor or single-document lookup matched nothing.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("no such document")]
    NotFound,
    #[error("document store error: {0}")]
    Store(#[from] mongodb::error::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
