use std::fmt::{Display, Formatter};

/// Error type for playback control and audio decoding.
#[derive(Debug)]
pub enum AudioError {
    /// An operation was requested in a state that cannot honor it.
    InvalidState(String),
    /// The source bytes could not be decoded into PCM.
    Decode(String),
    Io(std::io::Error),
    /// The output backend rejected or failed the request.
    Backend(String),
}

impl Display for AudioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidState(err) => write!(f, "invalid state: {}", err),
            Self::Decode(err) => write!(f, "decode error: {}", err),
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Backend(err) => write!(f, "backend error: {}", err),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<std::io::Error> for AudioError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
