//! Error types for MIDI input sessions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI driver init error: {0}")]
    DriverInit(String),

    #[error("MIDI input enumeration error: {0}")]
    Enumeration(String),

    #[error("MIDI device open error: {0}")]
    DeviceOpen(String),

    #[error("Invalid MIDI device index {index}: {available} device(s) available")]
    InvalidDeviceIndex { index: usize, available: usize },

    #[error("No MIDI input device matching '{0}'")]
    DeviceNotFound(String),

    #[error("MIDI listen attach error: {0}")]
    ListenAttach(String),

    #[error("MIDI device disconnected: {0}")]
    DeviceDisconnected(String),

    #[error("MIDI session is already listening")]
    AlreadyListening,

    #[error("MIDI session has been stopped")]
    SessionStopped,
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::DriverInit(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_index_message() {
        let err = Error::InvalidDeviceIndex {
            index: 3,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Invalid MIDI device index 3: 2 device(s) available"
        );
    }

    #[test]
    fn test_device_disconnected_message() {
        let err = Error::DeviceDisconnected("Keys".to_string());
        assert_eq!(err.to_string(), "MIDI device disconnected: Keys");
    }
}
