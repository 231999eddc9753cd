use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("not initialized: run 'cardsync init'")]
    NotInitialized,

    #[error("missing credentials: set api_key, api_token, and list_id in .cardsync/config.yaml or CARDSYNC_API_KEY / CARDSYNC_API_TOKEN / CARDSYNC_LIST_ID")]
    MissingCredentials,

    #[error("board API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
