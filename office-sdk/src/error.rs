use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("API error: {0}")]
    Api(#[from] office_api::ApiError),

    #[error("Transport error: {0}")]
    Transport(#[from] http_client::TransportError),

    #[error("Poller supervisor error: {0}")]
    Supervisor(#[from] office_stream::SupervisorError),

    #[error("Logging error: {0}")]
    Logging(#[from] office_state::LoggingError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Sync client is already started")]
    AlreadyStarted,

    #[error("Sync client has been shut down")]
    ShutDown,
}

pub type Result<T> = std::result::Result<T, SdkError>;
