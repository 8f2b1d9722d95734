/// All errors a [`crate::VariableStore`] can return. I/O and JSON failures
/// propagate unmasked to the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("save file i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("save file is not a valid record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timestamp formatting: {0}")]
    Timestamp(#[from] time::error::Format),
}
