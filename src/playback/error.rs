use crate::playback::store::WrongType;
use crate::routing::RouteError;

/// Playback failure, split by audience.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// Shown to the chatter as-is.
    #[error("{message}")]
    UserFacing { message: String },

    /// Logged; the chatter gets a generic reply.
    #[error("internal playback error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PlaybackError {
    pub fn user(message: impl Into<String>) -> Self {
        PlaybackError::UserFacing {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PlaybackError {
    fn from(err: serde_json::Error) -> Self {
        PlaybackError::Internal(Box::new(err))
    }
}

impl From<WrongType> for PlaybackError {
    fn from(err: WrongType) -> Self {
        PlaybackError::Internal(Box::new(err))
    }
}

impl From<PlaybackError> for RouteError {
    fn from(err: PlaybackError) -> Self {
        RouteError::handler(err)
    }
}
