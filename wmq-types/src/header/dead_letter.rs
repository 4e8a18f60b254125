use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{Endian, Reader, Writer},
    constants::{
        MqLong, MQAT_NO_CONTEXT, MQ_PUT_APPL_NAME_LENGTH, MQ_PUT_DATE_LENGTH,
        MQ_PUT_TIME_LENGTH, MQ_Q_MGR_NAME_LENGTH, MQ_Q_NAME_LENGTH,
    },
    error::DecodeError,
    format::Format,
};

use super::Link;

/// Eye-catcher of the dead-letter header
pub const MQDLH_STRUC_ID: &str = "DLH ";
/// Dead-letter header version
pub const MQDLH_VERSION_1: MqLong = 1;
/// Encoded length of the dead-letter header
pub const MQDLH_LENGTH: usize = 172;

/// Dead-letter header (`MQDLH`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadLetterHeader {
    /// Reason the message arrived on the dead-letter queue
    pub reason: MqLong,
    /// Name of the original destination queue
    pub dest_q_name: String,
    /// Name of the original destination queue manager
    pub dest_q_mgr_name: String,
    /// Type of application that put the message on the dead-letter queue
    pub put_appl_type: MqLong,
    /// Name of application that put the message on the dead-letter queue
    pub put_appl_name: String,
    /// Date when message was put on the dead-letter queue
    pub put_date: String,
    /// Time when message was put on the dead-letter queue
    pub put_time: String,
}

impl Default for DeadLetterHeader {
    fn default() -> Self {
        Self {
            reason: 0,
            dest_q_name: String::new(),
            dest_q_mgr_name: String::new(),
            put_appl_type: MQAT_NO_CONTEXT,
            put_appl_name: String::new(),
            put_date: String::new(),
            put_time: String::new(),
        }
    }
}

impl DeadLetterHeader {
    pub(crate) fn encode<B: BufMut>(&self, buf: &mut B, endian: Endian, next: &Link) {
        let mut w = Writer::new(buf, endian);
        w.put_slice(MQDLH_STRUC_ID.as_bytes());
        w.put_long(MQDLH_VERSION_1);
        w.put_long(self.reason);
        w.put_str(&self.dest_q_name, MQ_Q_NAME_LENGTH);
        w.put_str(&self.dest_q_mgr_name, MQ_Q_MGR_NAME_LENGTH);
        w.put_long(next.encoding);
        w.put_long(next.ccsid);
        w.put_slice(next.format.as_bytes());
        w.put_long(self.put_appl_type);
        w.put_str(&self.put_appl_name, MQ_PUT_APPL_NAME_LENGTH);
        w.put_str(&self.put_date, MQ_PUT_DATE_LENGTH);
        w.put_str(&self.put_time, MQ_PUT_TIME_LENGTH);
    }

    pub(crate) fn decode(buf: &[u8], endian: Endian) -> Result<(Self, Link, usize), DecodeError> {
        let mut r = Reader::new(buf, endian);
        r.expect_struc_id(MQDLH_STRUC_ID)?;
        let version = r.get_long()?;
        if version != MQDLH_VERSION_1 {
            return Err(DecodeError::Version(version));
        }
        let reason = r.get_long()?;
        let dest_q_name = r.get_str(MQ_Q_NAME_LENGTH)?;
        let dest_q_mgr_name = r.get_str(MQ_Q_MGR_NAME_LENGTH)?;
        let link = Link {
            encoding: r.get_long()?,
            ccsid: r.get_long()?,
            format: Format::from_bytes(r.get_array()?),
        };
        let dlh = Self {
            reason,
            dest_q_name,
            dest_q_mgr_name,
            put_appl_type: r.get_long()?,
            put_appl_name: r.get_str(MQ_PUT_APPL_NAME_LENGTH)?,
            put_date: r.get_str(MQ_PUT_DATE_LENGTH)?,
            put_time: r.get_str(MQ_PUT_TIME_LENGTH)?,
        };
        Ok((dlh, link, MQDLH_LENGTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MQENC_NATIVE;

    #[test]
    fn layout_is_fixed() {
        let link = Link {
            encoding: MQENC_NATIVE,
            ccsid: 1208,
            format: Format::STRING,
        };
        let dlh = DeadLetterHeader {
            reason: 2085,
            dest_q_name: "TEST.Q".to_string(),
            dest_q_mgr_name: "QM1".to_string(),
            ..Default::default()
        };
        let mut buf = Vec::new();
        dlh.encode(&mut buf, Endian::Big, &link);
        assert_eq!(buf.len(), MQDLH_LENGTH);
        assert_eq!(&buf[..4], b"DLH ");
        assert_eq!(&buf[8..12], &[0, 0, 0x08, 0x25]);
        assert_eq!(&buf[116..124], b"MQSTR   ");

        let (decoded, decoded_link, consumed) = DeadLetterHeader::decode(&buf, Endian::Big).unwrap();
        assert_eq!(decoded, dlh);
        assert_eq!(decoded_link, link);
        assert_eq!(consumed, MQDLH_LENGTH);
    }
}
