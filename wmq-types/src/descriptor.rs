//! The message descriptor (MQMD) record and message identifiers.

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{Endian, Reader, Writer},
    constants::*,
    error::DecodeError,
    format::Format,
};

/// Eye-catcher of the message descriptor
pub const MQMD_STRUC_ID: &str = "MD  ";
/// Current descriptor version
pub const MQMD_VERSION_2: MqLong = 2;
/// Version 1 descriptor, without the grouping and segmentation fields
pub const MQMD_VERSION_1: MqLong = 1;
/// Encoded length of a version 1 descriptor
pub const MQMD_LENGTH_1: usize = 324;
/// Encoded length of a version 2 descriptor
pub const MQMD_LENGTH_2: usize = 364;

/// Message identifier, correlation identifier or group identifier
pub type MessageId = [u8; MQ_MSG_ID_LENGTH];

/// Message descriptor (`MQMD`)
///
/// `format`, `encoding` and `coded_char_set_id` always describe the
/// application data. When a message carries headers the wire chain is
/// rewritten on encode and collapsed again on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageDescriptor {
    /// Options for report messages
    pub report: MqLong,
    /// Message type
    pub msg_type: MqLong,
    /// Message lifetime in tenths of a second
    pub expiry: MqLong,
    /// Feedback or reason code
    pub feedback: MqLong,
    /// Numeric encoding of the message data
    pub encoding: MqLong,
    /// Character set identifier of the message data
    pub coded_char_set_id: MqLong,
    /// Format name of the message data
    pub format: Format,
    /// Message priority
    pub priority: MqLong,
    /// Message persistence
    pub persistence: MqLong,
    /// Message identifier
    pub msg_id: MessageId,
    /// Correlation identifier
    pub correl_id: MessageId,
    /// Backout counter
    pub backout_count: MqLong,
    /// Name of the reply queue
    pub reply_to_q: String,
    /// Name of the reply queue manager
    pub reply_to_q_mgr: String,
    /// User identifier
    pub user_identifier: String,
    /// Accounting token
    pub accounting_token: [u8; MQ_ACCOUNTING_TOKEN_LENGTH],
    /// Application data relating to identity
    pub appl_identity_data: String,
    /// Type of application that put the message
    pub put_appl_type: MqLong,
    /// Name of application that put the message
    pub put_appl_name: String,
    /// Date when message was put, `YYYYMMDD`
    pub put_date: String,
    /// Time when message was put, `HHMMSSTH`
    pub put_time: String,
    /// Application data relating to origin
    pub appl_origin_data: String,
    /// Group identifier
    pub group_id: MessageId,
    /// Sequence number of logical message within group
    pub msg_seq_number: MqLong,
    /// Offset of data in physical message from start of logical message
    pub offset: MqLong,
    /// Message flags
    pub msg_flags: MqLong,
    /// Length of original message
    pub original_length: MqLong,
}

impl Default for MessageDescriptor {
    fn default() -> Self {
        Self {
            report: MQRO_NONE,
            msg_type: MQMT_DATAGRAM,
            expiry: MQEI_UNLIMITED,
            feedback: MQFB_NONE,
            encoding: MQENC_NATIVE,
            coded_char_set_id: MQCCSI_Q_MGR,
            format: Format::NONE,
            priority: MQPRI_PRIORITY_AS_Q_DEF,
            persistence: MQPER_PERSISTENCE_AS_Q_DEF,
            msg_id: MQMI_NONE,
            correl_id: MQCI_NONE,
            backout_count: 0,
            reply_to_q: String::new(),
            reply_to_q_mgr: String::new(),
            user_identifier: String::new(),
            accounting_token: MQACT_NONE,
            appl_identity_data: String::new(),
            put_appl_type: MQAT_NO_CONTEXT,
            put_appl_name: String::new(),
            put_date: String::new(),
            put_time: String::new(),
            appl_origin_data: String::new(),
            group_id: MQGI_NONE,
            msg_seq_number: 1,
            offset: 0,
            msg_flags: 0,
            original_length: MQOL_UNDEFINED,
        }
    }
}

impl MessageDescriptor {
    /// Whether the message type is `MQMT_REQUEST`
    pub fn is_request(&self) -> bool {
        self.msg_type == MQMT_REQUEST
    }

    /// Encodes a version 2 descriptor in native byte order, with the chain
    /// fields replaced by `encoding`, `ccsid` and `format`
    pub(crate) fn encode_chained<B: BufMut>(
        &self,
        buf: &mut B,
        encoding: MqLong,
        ccsid: MqLong,
        format: &Format,
    ) {
        let mut w = Writer::new(buf, Endian::native());
        w.put_slice(MQMD_STRUC_ID.as_bytes());
        w.put_long(MQMD_VERSION_2);
        w.put_long(self.report);
        w.put_long(self.msg_type);
        w.put_long(self.expiry);
        w.put_long(self.feedback);
        w.put_long(encoding);
        w.put_long(ccsid);
        w.put_slice(format.as_bytes());
        w.put_long(self.priority);
        w.put_long(self.persistence);
        w.put_slice(&self.msg_id);
        w.put_slice(&self.correl_id);
        w.put_long(self.backout_count);
        w.put_str(&self.reply_to_q, MQ_Q_NAME_LENGTH);
        w.put_str(&self.reply_to_q_mgr, MQ_Q_MGR_NAME_LENGTH);
        w.put_str(&self.user_identifier, MQ_USER_ID_LENGTH);
        w.put_slice(&self.accounting_token);
        w.put_str(&self.appl_identity_data, MQ_APPL_IDENTITY_DATA_LENGTH);
        w.put_long(self.put_appl_type);
        w.put_str(&self.put_appl_name, MQ_PUT_APPL_NAME_LENGTH);
        w.put_str(&self.put_date, MQ_PUT_DATE_LENGTH);
        w.put_str(&self.put_time, MQ_PUT_TIME_LENGTH);
        w.put_str(&self.appl_origin_data, MQ_APPL_ORIGIN_DATA_LENGTH);
        w.put_slice(&self.group_id);
        w.put_long(self.msg_seq_number);
        w.put_long(self.offset);
        w.put_long(self.msg_flags);
        w.put_long(self.original_length);
    }

    /// Encodes the descriptor on its own, in native byte order
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        self.encode_chained(buf, self.encoding, self.coded_char_set_id, &self.format)
    }

    /// Decodes a version 1 or version 2 descriptor in native byte order.
    /// Returns the descriptor and the number of bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut r = Reader::new(buf, Endian::native());
        r.expect_struc_id(MQMD_STRUC_ID)?;
        let version = r.get_long()?;
        if version != MQMD_VERSION_1 && version != MQMD_VERSION_2 {
            return Err(DecodeError::Version(version));
        }

        let mut md = Self {
            report: r.get_long()?,
            msg_type: r.get_long()?,
            expiry: r.get_long()?,
            feedback: r.get_long()?,
            encoding: r.get_long()?,
            coded_char_set_id: r.get_long()?,
            format: Format::from_bytes(r.get_array()?),
            priority: r.get_long()?,
            persistence: r.get_long()?,
            msg_id: r.get_array()?,
            correl_id: r.get_array()?,
            backout_count: r.get_long()?,
            reply_to_q: r.get_str(MQ_Q_NAME_LENGTH)?,
            reply_to_q_mgr: r.get_str(MQ_Q_MGR_NAME_LENGTH)?,
            user_identifier: r.get_str(MQ_USER_ID_LENGTH)?,
            accounting_token: r.get_array()?,
            appl_identity_data: r.get_str(MQ_APPL_IDENTITY_DATA_LENGTH)?,
            put_appl_type: r.get_long()?,
            put_appl_name: r.get_str(MQ_PUT_APPL_NAME_LENGTH)?,
            put_date: r.get_str(MQ_PUT_DATE_LENGTH)?,
            put_time: r.get_str(MQ_PUT_TIME_LENGTH)?,
            appl_origin_data: r.get_str(MQ_APPL_ORIGIN_DATA_LENGTH)?,
            ..Default::default()
        };

        if version == MQMD_VERSION_2 {
            md.group_id = r.get_array()?;
            md.msg_seq_number = r.get_long()?;
            md.offset = r.get_long()?;
            md.msg_flags = r.get_long()?;
            md.original_length = r.get_long()?;
        }

        let consumed = buf.len() - r.remaining();
        Ok((md, consumed))
    }
}
