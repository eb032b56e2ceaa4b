use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide the book name")]
    NameRequired,

    #[error("readPage must not be greater than pageCount")]
    ReadPageExceedsPageCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("book not found")]
    NotFound,

    #[error("internal store error: {0}")]
    Internal(String),
}
