use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::constants::{
    MQFMT_DEAD_LETTER_HEADER, MQFMT_HEADER_PREFIX, MQFMT_RF_HEADER_2, MQ_FORMAT_LENGTH,
};

/// Eight-character format name describing the data that follows a structure
///
/// The name is held blank-padded exactly as it appears on the wire so that a
/// decoded message compares equal to the message that was encoded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Format([u8; MQ_FORMAT_LENGTH]);

impl Format {
    /// `MQFMT_NONE`
    pub const NONE: Format = Format(*b"        ");
    /// `MQFMT_STRING`
    pub const STRING: Format = Format(*b"MQSTR   ");
    /// `MQFMT_DEAD_LETTER_HEADER`
    pub const DEAD_LETTER_HEADER: Format = Format(*b"MQDEAD  ");
    /// `MQFMT_RF_HEADER_2`
    pub const RF_HEADER_2: Format = Format(*b"MQHRF2  ");
    /// `MQFMT_ADMIN`
    pub const ADMIN: Format = Format(*b"MQADMIN ");

    /// Creates a format name, blank-padding or truncating to eight bytes
    pub fn new(name: &str) -> Self {
        let mut bytes = [b' '; MQ_FORMAT_LENGTH];
        let src = name.as_bytes();
        let len = src.len().min(MQ_FORMAT_LENGTH);
        bytes[..len].copy_from_slice(&src[..len]);
        Self(bytes)
    }

    /// Wraps a format name read from the wire
    pub fn from_bytes(bytes: [u8; MQ_FORMAT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Wire representation
    pub fn as_bytes(&self) -> &[u8; MQ_FORMAT_LENGTH] {
        &self.0
    }

    /// The name without trailing blanks
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.0).trim_end().to_string()
    }

    /// Whether this format designates a header structure this crate decodes
    pub fn is_known_header(&self) -> bool {
        *self == Self::DEAD_LETTER_HEADER || *self == Self::RF_HEADER_2
    }

    /// Whether this format uses the naming convention reserved for vendor
    /// header structures
    pub fn is_header(&self) -> bool {
        self.is_known_header() || self.0.starts_with(MQFMT_HEADER_PREFIX.as_bytes())
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<&str> for Format {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Format {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<Format> for String {
    fn from(value: Format) -> Self {
        value.name()
    }
}

impl std::fmt::Debug for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Format({:?})", self.name())
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
