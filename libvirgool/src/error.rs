//! Error types for the Virgool cross-posting core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VirgoolError>;

#[derive(Error, Debug)]
pub enum VirgoolError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Link store error: {0}")]
    Links(#[from] LinkStoreError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Content item '{0}' already has a cross-post link")]
    AlreadyLinked(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VirgoolError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            VirgoolError::InvalidInput(_) => 3,
            VirgoolError::Api(ApiError::LoginFailed(_)) => 2,
            VirgoolError::Api(_) => 1,
            VirgoolError::AlreadyLinked(_) => 1,
            VirgoolError::Config(_) => 1,
            VirgoolError::Links(_) => 1,
        }
    }
}

/// Errors raised by the API client, one kind per remote operation.
///
/// Empty bodies, malformed JSON, and explicit `success: false` envelopes all
/// collapse into the operation's own variant; a raw decode error never
/// reaches the caller.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Login to the publishing API failed: {0}")]
    LoginFailed(String),

    #[error("Invalid post status '{0}', expected 'draft' or 'publish'")]
    InvalidStatus(String),

    #[error("Retrieving user info failed: {0}")]
    RetrieveUserInfoFailed(String),

    #[error("Retrieving user posts failed: {0}")]
    RetrieveUserPostsFailed(String),

    #[error("Creating user post failed: {0}")]
    CreateUserPostFailed(String),

    #[error("Uploading primary image failed: {0}")]
    UploadFailed(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum LinkStoreError {
    #[error("Link store operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to encode remote post: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
