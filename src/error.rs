//! Error types for souschef.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SousChefError {
    // Creation / command validation errors
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    // Lookup errors
    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    #[error("Timer not found: {id}")]
    TimerNotFound { id: String },

    #[error("Step not found: {id}")]
    StepNotFound { id: String },

    // Lifecycle errors
    #[error("Session {id} is finished and no longer accepts commands")]
    SessionTerminated { id: String },

    #[error("Session {id} was already completed or abandoned")]
    AlreadyTerminated { id: String },

    // Settings errors
    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl SousChefError {
    /// Shorthand for an `InvalidInput` error with a formatted message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SousChefError>;
