use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{Endian, Reader, Writer},
    constants::{MqLong, MQCCSI_UTF8},
    error::DecodeError,
    format::Format,
};

use super::Link;

/// Eye-catcher of the rules and formatting header
pub const MQRFH_STRUC_ID: &str = "RFH ";
/// Rules and formatting header version 2
pub const MQRFH_VERSION_2: MqLong = 2;
/// Length of the fixed part of the rules and formatting header
pub const MQRFH2_FIXED_LENGTH: usize = 36;
/// No flags
pub const MQRFH_NONE: MqLong = 0;

/// Rules and formatting header version 2 (`MQRFH2`)
///
/// The variable part is a list of name/value folders. Each folder is written
/// blank-padded to a multiple of four bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rfh2Header {
    /// Flags
    pub flags: MqLong,
    /// Character set of the name/value folders
    pub name_value_ccsid: MqLong,
    /// Name/value folders, e.g. `<mcd><Msd>jms_text</Msd></mcd>`
    pub folders: Vec<String>,
}

impl Default for Rfh2Header {
    fn default() -> Self {
        Self {
            flags: MQRFH_NONE,
            name_value_ccsid: MQCCSI_UTF8,
            folders: Vec::new(),
        }
    }
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

impl Rfh2Header {
    /// Encoded length of the whole header including the folders
    pub fn struc_length(&self) -> usize {
        MQRFH2_FIXED_LENGTH
            + self
                .folders
                .iter()
                .map(|folder| 4 + padded_len(folder.len()))
                .sum::<usize>()
    }

    pub(crate) fn encode<B: BufMut>(&self, buf: &mut B, endian: Endian, next: &Link) {
        let mut w = Writer::new(buf, endian);
        w.put_slice(MQRFH_STRUC_ID.as_bytes());
        w.put_long(MQRFH_VERSION_2);
        w.put_long(self.struc_length() as MqLong);
        w.put_long(next.encoding);
        w.put_long(next.ccsid);
        w.put_slice(next.format.as_bytes());
        w.put_long(self.flags);
        w.put_long(self.name_value_ccsid);
        for folder in &self.folders {
            let len = padded_len(folder.len());
            w.put_long(len as MqLong);
            w.put_str(folder, len);
        }
    }

    pub(crate) fn decode(buf: &[u8], endian: Endian) -> Result<(Self, Link, usize), DecodeError> {
        let mut r = Reader::new(buf, endian);
        r.expect_struc_id(MQRFH_STRUC_ID)?;
        let version = r.get_long()?;
        if version != MQRFH_VERSION_2 {
            return Err(DecodeError::Version(version));
        }
        let struc_length = r.get_long()?;
        let total = usize::try_from(struc_length)
            .ok()
            .filter(|len| *len >= MQRFH2_FIXED_LENGTH && *len <= buf.len())
            .ok_or(DecodeError::InvalidLength(struc_length))?;

        let link = Link {
            encoding: r.get_long()?,
            ccsid: r.get_long()?,
            format: Format::from_bytes(r.get_array()?),
        };
        let flags = r.get_long()?;
        let name_value_ccsid = r.get_long()?;

        let mut folders = Vec::new();
        let mut consumed = MQRFH2_FIXED_LENGTH;
        while consumed < total {
            let raw_len = r.get_long()?;
            let len = usize::try_from(raw_len)
                .ok()
                .filter(|len| consumed + 4 + len <= total)
                .ok_or(DecodeError::InvalidLength(raw_len))?;
            folders.push(r.get_str(len)?);
            consumed += 4 + len;
        }

        let rfh2 = Self {
            flags,
            name_value_ccsid,
            folders,
        };
        Ok((rfh2, link, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MQENC_NATIVE;

    fn link() -> Link {
        Link {
            encoding: MQENC_NATIVE,
            ccsid: MQCCSI_UTF8,
            format: Format::STRING,
        }
    }

    #[test]
    fn folders_are_padded_to_four_bytes() {
        let rfh2 = Rfh2Header {
            folders: vec![
                "<mcd><Msd>jms_text</Msd></mcd>".to_string(),
                "<usr><k>v</k></usr>".to_string(),
            ],
            ..Default::default()
        };
        let mut buf = Vec::new();
        rfh2.encode(&mut buf, Endian::Little, &link());
        // 36 + (4 + 32) + (4 + 20)
        assert_eq!(buf.len(), 96);
        assert_eq!(rfh2.struc_length(), 96);
        assert_eq!(&buf[8..12], &96i32.to_le_bytes());

        let (decoded, decoded_link, consumed) = Rfh2Header::decode(&buf, Endian::Little).unwrap();
        assert_eq!(decoded, rfh2);
        assert_eq!(decoded_link, link());
        assert_eq!(consumed, 96);
    }

    #[test]
    fn struc_length_beyond_buffer_is_rejected() {
        let mut buf = Vec::new();
        Rfh2Header::default().encode(&mut buf, Endian::Big, &link());
        buf[8..12].copy_from_slice(&400i32.to_be_bytes());
        assert_eq!(
            Rfh2Header::decode(&buf, Endian::Big),
            Err(DecodeError::InvalidLength(400))
        );
    }
}
