use thiserror::Error;

#[derive(Error, Debug)]
pub enum LadderError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No ladder entries could be read for invasion {invasion}")]
    EmptyLadder { invasion: String },

    #[error("Invasion '{id}' not found")]
    InvasionNotFound { id: String },

    #[error("No ladder stored for invasion '{invasion}'")]
    LadderNotFound { invasion: String },

    #[error("Member '{name}' already on the roster")]
    DuplicateMember { name: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LadderError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        LadderError::InvalidRequest { reason: reason.into() }
    }
}

pub type LadderResult<T> = Result<T, LadderError>;
