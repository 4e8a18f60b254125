//! Put options shared by queue puts and single puts

use serde::Deserialize;
use wmq_types::{
    constants::{
        MqLong, MQPMO_FAIL_IF_QUIESCING, MQPMO_NEW_CORREL_ID, MQPMO_NEW_MSG_ID,
        MQPMO_NO_SYNCPOINT, MQPMO_SYNCPOINT,
    },
    options::PutOptions,
    Message, MessageDescriptor,
};

/// How a message is put
///
/// By default the queue manager assigns a new message identifier on every
/// put and leaves the correlation identifier as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PutParams {
    /// Additional `MQPMO_*` flags
    pub options: MqLong,
    /// Put within the current unit of work
    pub sync: bool,
    /// Ask for a new message identifier
    pub new_msg_id: bool,
    /// Ask for a new correlation identifier
    pub new_correl_id: bool,
    /// Fail when the queue manager is quiescing
    pub fail_if_quiescing: bool,
}

impl Default for PutParams {
    fn default() -> Self {
        Self {
            options: 0,
            sync: false,
            new_msg_id: true,
            new_correl_id: false,
            fail_if_quiescing: true,
        }
    }
}

impl PutParams {
    /// Default put options
    pub fn new() -> Self {
        Self::default()
    }

    /// Put within the current unit of work
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Ask for a new message identifier. When `false` the identifier in the
    /// descriptor is kept.
    pub fn new_msg_id(mut self, value: bool) -> Self {
        self.new_msg_id = value;
        self
    }

    /// Ask for a new correlation identifier
    pub fn new_correl_id(mut self, value: bool) -> Self {
        self.new_correl_id = value;
        self
    }

    /// Fail when the queue manager is quiescing
    pub fn fail_if_quiescing(mut self, value: bool) -> Self {
        self.fail_if_quiescing = value;
        self
    }

    /// Additional `MQPMO_*` flags
    pub fn options(mut self, options: MqLong) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn to_pmo(&self) -> PutOptions {
        let mut options = self.options;
        if self.options & (MQPMO_SYNCPOINT | MQPMO_NO_SYNCPOINT) == 0 {
            options |= if self.sync {
                MQPMO_SYNCPOINT
            } else {
                MQPMO_NO_SYNCPOINT
            };
        }
        if self.new_msg_id {
            options |= MQPMO_NEW_MSG_ID;
        }
        if self.new_correl_id {
            options |= MQPMO_NEW_CORREL_ID;
        }
        if self.fail_if_quiescing {
            options |= MQPMO_FAIL_IF_QUIESCING;
        }
        PutOptions {
            options,
            ..Default::default()
        }
    }
}

/// Encodes the message into the wire descriptor and the bytes that follow it
pub(crate) fn prepare(message: &Message) -> (MessageDescriptor, Vec<u8>) {
    let payload = message.encode_payload();
    let mut md = message.descriptor.clone();
    md.format = payload.format;
    md.encoding = payload.encoding;
    md.coded_char_set_id = payload.coded_char_set_id;
    (md, payload.bytes)
}

/// Copies the fields set by the queue manager back into the message while
/// keeping the description of the application data
pub(crate) fn write_back(message: &mut Message, mut md: MessageDescriptor) {
    md.format = message.descriptor.format;
    md.encoding = message.descriptor.encoding;
    md.coded_char_set_id = message.descriptor.coded_char_set_id;
    message.descriptor = md;
}

pub(crate) fn trace(_trace_level: u8, _q_name: &str, _md: &MessageDescriptor, _len: usize) {
    if _trace_level >= 3 {
        #[cfg(feature = "tracing")]
        tracing::trace!(q_name = _q_name, descriptor = ?_md, length = _len, "Put");
        #[cfg(feature = "log")]
        log::trace!("Put to {}: {} bytes, {:?}", _q_name, _len, _md);
    }
}
