use std::io::{Error as IoError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Payload decode error: {0}")]
    PayloadDecode(String),

    #[error("Size mismatch: declared {declared} bytes, encoded {encoded} bytes")]
    SizeMismatch { declared: usize, encoded: usize },

    #[error("AMF decode error: {0}")]
    AmfDecode(String),

    #[error("AMF encode error: {0}")]
    AmfEncode(String),

    #[error("Chunk error: {0}")]
    Chunk(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a malformed header error
    pub fn malformed_header(msg: impl Into<String>) -> Self {
        Error::MalformedHeader(msg.into())
    }

    /// Create a payload decode error
    pub fn payload_decode(msg: impl Into<String>) -> Self {
        Error::PayloadDecode(msg.into())
    }

    /// Create a size mismatch error
    pub fn size_mismatch(declared: usize, encoded: usize) -> Self {
        Error::SizeMismatch { declared, encoded }
    }

    /// Create an AMF decode error
    pub fn amf_decode(msg: impl Into<String>) -> Self {
        Error::AmfDecode(msg.into())
    }

    /// Create an AMF encode error
    pub fn amf_encode(msg: impl Into<String>) -> Self {
        Error::AmfEncode(msg.into())
    }

    /// Create a chunk error
    pub fn chunk(msg: impl Into<String>) -> Self {
        Error::Chunk(msg.into())
    }

    /// Create a not implemented error
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Error::NotImplemented(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Map an IO failure hit while reading header bytes.
    ///
    /// Running out of bytes mid-header is a framing problem, anything else is
    /// left as a transport error.
    pub fn truncated_header(what: &str, err: IoError) -> Self {
        if err.kind() == ErrorKind::UnexpectedEof {
            Error::MalformedHeader(format!("truncated {}", what))
        } else {
            Error::Io(err)
        }
    }

    /// Map an IO failure hit while decoding a message payload
    pub fn truncated_payload(what: &str, err: IoError) -> Self {
        if err.kind() == ErrorKind::UnexpectedEof {
            Error::PayloadDecode(format!("truncated {}", what))
        } else {
            Error::Io(err)
        }
    }

    /// Whether the connection's framing can no longer be trusted after this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::PayloadDecode(_) | Error::AmfDecode(_) | Error::NotImplemented(_))
    }
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownMessageType(0x42);
        assert_eq!(format!("{}", err), "Unknown message type: 66");

        let err = Error::size_mismatch(10, 12);
        assert_eq!(
            format!("{}", err),
            "Size mismatch: declared 10 bytes, encoded 12 bytes"
        );
    }

    #[test]
    fn test_truncated_header_mapping() {
        let eof = IoError::new(ErrorKind::UnexpectedEof, "EOF");
        assert!(matches!(
            Error::truncated_header("basic header", eof),
            Error::MalformedHeader(_)
        ));

        let reset = IoError::new(ErrorKind::ConnectionReset, "reset");
        assert!(matches!(Error::truncated_header("basic header", reset), Error::Io(_)));
    }

    #[test]
    fn test_fatality() {
        assert!(Error::malformed_header("x").is_fatal());
        assert!(Error::UnknownMessageType(0).is_fatal());
        assert!(!Error::payload_decode("x").is_fatal());
    }
}
