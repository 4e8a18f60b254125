//! Message model and wire codec
//!
//! On the wire a message is the fixed descriptor block, then each header in
//! list order, then the application data. Every structure names the format
//! of the structure that follows it.

use serde::{Deserialize, Serialize};

use crate::{
    codec::Endian,
    constants::MqLong,
    descriptor::MessageDescriptor,
    error::DecodeError,
    format::Format,
    header::{Header, Link},
};

mod builder;
pub use builder::*;

mod reply;

/// Encoded headers and data handed to a put call, together with the chain
/// fields the descriptor must carry on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Format of the first structure after the descriptor
    pub format: Format,
    /// Encoding of the first structure after the descriptor
    pub encoding: MqLong,
    /// Character set of the first structure after the descriptor
    pub coded_char_set_id: MqLong,
    /// Headers followed by the application data
    pub bytes: Vec<u8>,
}

/// A message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message descriptor
    pub descriptor: MessageDescriptor,

    /// Headers, head first
    #[serde(default)]
    pub headers: Vec<Header>,

    /// Application data
    #[serde(with = "serde_bytes", default)]
    pub data: Vec<u8>,
}

impl Message {
    /// Creates a message with default descriptor and no data
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message carrying `data`
    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    /// Creates a builder for [`Message`]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Resets descriptor, headers and data so the value can be reused for
    /// another get
    pub fn clear(&mut self) {
        self.descriptor = MessageDescriptor::default();
        self.headers.clear();
        self.data.clear();
    }

    /// Encodes the headers and the data
    pub fn encode_payload(&self) -> Payload {
        let endian = Endian::from_encoding(self.descriptor.encoding);
        let mut bytes = Vec::with_capacity(self.data.len());
        for (index, header) in self.headers.iter().enumerate() {
            let next = Link {
                encoding: self.descriptor.encoding,
                ccsid: self.descriptor.coded_char_set_id,
                format: self
                    .headers
                    .get(index + 1)
                    .map(Header::format)
                    .unwrap_or(self.descriptor.format),
            };
            header.encode(&mut bytes, endian, &next);
        }
        bytes.extend_from_slice(&self.data);

        Payload {
            format: self
                .headers
                .first()
                .map(Header::format)
                .unwrap_or(self.descriptor.format),
            encoding: self.descriptor.encoding,
            coded_char_set_id: self.descriptor.coded_char_set_id,
            bytes,
        }
    }

    /// Rebuilds a message from a descriptor as returned on the wire and the
    /// bytes that followed it.
    ///
    /// Header records are consumed while the chained format names a header;
    /// whatever remains is application data. A format that follows the
    /// header naming convention but is not supported is an error.
    pub fn decode_payload(
        mut descriptor: MessageDescriptor,
        buf: &[u8],
    ) -> Result<Self, DecodeError> {
        let mut link = Link {
            encoding: descriptor.encoding,
            ccsid: descriptor.coded_char_set_id,
            format: descriptor.format,
        };
        let mut rest = buf;
        let mut headers = Vec::new();
        while link.format.is_header() {
            let endian = Endian::from_encoding(link.encoding);
            let (header, next, consumed) = Header::decode(&link.format, rest, endian)?;
            headers.push(header);
            rest = &rest[consumed..];
            link = next;
        }

        descriptor.encoding = link.encoding;
        descriptor.coded_char_set_id = link.ccsid;
        descriptor.format = link.format;
        Ok(Self {
            descriptor,
            headers,
            data: rest.to_vec(),
        })
    }

    /// Produces the full wire layout: descriptor block, headers, data
    pub fn serialize(&self) -> Vec<u8> {
        let payload = self.encode_payload();
        let mut buf = Vec::with_capacity(crate::descriptor::MQMD_LENGTH_2 + payload.bytes.len());
        self.descriptor.encode_chained(
            &mut buf,
            payload.encoding,
            payload.coded_char_set_id,
            &payload.format,
        );
        buf.extend_from_slice(&payload.bytes);
        buf
    }

    /// Inverse of [`Message::serialize`]
    pub fn deserialize(buf: &[u8]) -> Result<Self, DecodeError> {
        let (descriptor, consumed) = MessageDescriptor::decode(buf)?;
        Self::decode_payload(descriptor, &buf[consumed..])
    }
}
