use smotree_core::error::CoreError;

/// Error returned by every [`ReviewStore`](crate::ReviewStore) operation.
///
/// Domain failures (missing rows, framerate conflicts, bad parents) arrive as
/// [`CoreError`]; everything else is the backend's own error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Shorthand for a [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: smotree_core::types::DbId) -> Self {
        Self::Core(CoreError::NotFound { entity, id })
    }
}
