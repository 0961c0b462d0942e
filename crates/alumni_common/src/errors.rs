use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlumniServerError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Duplicate value for unique field `{field}` in {collection}")]
    Duplicate { collection: String, field: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("Users cannot send connection requests to themselves")]
    SelfConnection,
    #[error("Connection request already sent")]
    RequestAlreadySent,
    #[error("Users are already connected")]
    AlreadyConnected,
    #[error("No pending connection request from {0}")]
    NoPendingRequest(String),
    #[error("Event {0} is at capacity")]
    EventFull(String),
    #[error("Donation amount must be a positive number")]
    InvalidDonation,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Mongo error: {0}")]
    MongoError(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Could not connect to database: {0}")]
    Connection(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bson::ser::Error> for AlumniServerError {
    fn from(e: bson::ser::Error) -> Self {
        AlumniServerError::Serialization(e.to_string())
    }
}

impl From<bson::de::Error> for AlumniServerError {
    fn from(e: bson::de::Error) -> Self {
        AlumniServerError::Serialization(e.to_string())
    }
}
