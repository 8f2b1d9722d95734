/// Errors surfaced by the host layer.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("host i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("package metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] yurei_eval::EngineError),

    #[error(transparent)]
    Store(#[from] yurei_storage::StoreError),
}
