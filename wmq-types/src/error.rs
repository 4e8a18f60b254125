//! Errors of the wire codec and the message builders

use crate::constants::MqLong;

/// Errors encountered while decoding a wire buffer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended before the structure was complete
    #[error("Buffer truncated: {expected} bytes required, {remaining} remaining")]
    Truncated {
        /// Number of bytes required by the field being read
        expected: usize,
        /// Number of bytes left in the buffer
        remaining: usize,
    },

    /// A structure did not start with its expected eye-catcher
    #[error("Invalid structure id {found:?}, expected {expected:?}")]
    StrucId {
        /// Expected eye-catcher
        expected: &'static str,
        /// Eye-catcher found in the buffer
        found: String,
    },

    /// The format name designates a header structure this crate cannot decode
    #[error("Unsupported header format {0:?}")]
    UnsupportedHeader(String),

    /// A structure length field is inconsistent with the structure
    #[error("Invalid structure length {0}")]
    InvalidLength(MqLong),

    /// The structure version is not supported
    #[error("Unsupported structure version {0}")]
    Version(MqLong),
}

/// Returned when a reply is requested for a message that is not a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Message type {msg_type} is not a request")]
pub struct NotARequest {
    /// Message type of the original message
    pub msg_type: MqLong,
}
