//! Header records carried in front of the application data
//!
//! Each record names the format, encoding and character set of whatever
//! follows it. Those chain fields are not part of the header models below;
//! they are produced when a [`Message`](crate::Message) is encoded and
//! consumed when it is decoded.

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::{
    codec::Endian,
    constants::MqLong,
    error::DecodeError,
    format::Format,
};

mod dead_letter;
pub use dead_letter::*;

mod rfh2;
pub use rfh2::*;

/// Format, encoding and character set of the next structure in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Link {
    pub encoding: MqLong,
    pub ccsid: MqLong,
    pub format: Format,
}

/// A header record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Header {
    /// Dead-letter header (`MQDLH`)
    DeadLetter(DeadLetterHeader),

    /// Rules and formatting header version 2 (`MQRFH2`)
    Rfh2(Rfh2Header),
}

impl Header {
    /// Format name that designates this header in the preceding structure
    pub fn format(&self) -> Format {
        match self {
            Header::DeadLetter(_) => Format::DEAD_LETTER_HEADER,
            Header::Rfh2(_) => Format::RF_HEADER_2,
        }
    }

    /// Input-only headers describe how a message arrived and are not carried
    /// over when its metadata is copied into a new message
    pub fn is_input_only(&self) -> bool {
        matches!(self, Header::DeadLetter(_))
    }

    pub(crate) fn encode<B: BufMut>(&self, buf: &mut B, endian: Endian, next: &Link) {
        match self {
            Header::DeadLetter(dlh) => dlh.encode(buf, endian, next),
            Header::Rfh2(rfh2) => rfh2.encode(buf, endian, next),
        }
    }

    /// Decodes the header designated by `format`, returning the header, the
    /// link to the next structure and the number of bytes consumed
    pub(crate) fn decode(
        format: &Format,
        buf: &[u8],
        endian: Endian,
    ) -> Result<(Self, Link, usize), DecodeError> {
        if *format == Format::DEAD_LETTER_HEADER {
            let (dlh, link, consumed) = DeadLetterHeader::decode(buf, endian)?;
            Ok((Header::DeadLetter(dlh), link, consumed))
        } else if *format == Format::RF_HEADER_2 {
            let (rfh2, link, consumed) = Rfh2Header::decode(buf, endian)?;
            Ok((Header::Rfh2(rfh2), link, consumed))
        } else {
            Err(DecodeError::UnsupportedHeader(format.name()))
        }
    }
}

impl From<DeadLetterHeader> for Header {
    fn from(value: DeadLetterHeader) -> Self {
        Header::DeadLetter(value)
    }
}

impl From<Rfh2Header> for Header {
    fn from(value: Rfh2Header) -> Self {
        Header::Rfh2(value)
    }
}
