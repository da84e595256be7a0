//! Store error taxonomy.

/// Errors shared by every entity store.
///
/// Backends translate their native failures at the boundary: uniqueness
/// violations become `AlreadyExists`, row-not-found becomes `NotFound`,
/// everything else is `Backend`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists)
    }
}

/// Map a sqlx error into the store taxonomy for `create` operations.
pub(crate) fn translate_create(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::AlreadyExists;
        }
    }
    StoreError::Backend(err)
}
