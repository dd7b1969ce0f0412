use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Export/import blob that cannot be decoded. Recoverable: the host
    /// reports "invalid save" and keeps the current state.
    #[error("Invalid save data: {0}")]
    InvalidSave(String),

    /// A compiled-in registry id was referenced that does not exist.
    /// This is a programmer error, not a player-reachable condition.
    #[error("Unknown content id '{id}'")]
    UnknownContentId { id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
