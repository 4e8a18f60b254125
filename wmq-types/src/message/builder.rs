use crate::{
    constants::MqLong,
    descriptor::{MessageDescriptor, MessageId},
    format::Format,
    header::Header,
};

use super::Message;

/// Builder for [`Message`]
#[derive(Debug, Clone, Default)]
pub struct Builder {
    /// Message descriptor
    pub descriptor: MessageDescriptor,
    /// Headers, head first
    pub headers: Vec<Header>,
    /// Application data
    pub data: Vec<u8>,
}

impl Builder {
    /// Creates a builder with a default descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole descriptor
    pub fn descriptor(mut self, descriptor: MessageDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Message type
    pub fn msg_type(mut self, msg_type: MqLong) -> Self {
        self.descriptor.msg_type = msg_type;
        self
    }

    /// Report options
    pub fn report(mut self, report: MqLong) -> Self {
        self.descriptor.report = report;
        self
    }

    /// Format of the application data
    pub fn format(mut self, format: impl Into<Format>) -> Self {
        self.descriptor.format = format.into();
        self
    }

    /// Priority
    pub fn priority(mut self, priority: MqLong) -> Self {
        self.descriptor.priority = priority;
        self
    }

    /// Persistence
    pub fn persistence(mut self, persistence: MqLong) -> Self {
        self.descriptor.persistence = persistence;
        self
    }

    /// Expiry in tenths of a second
    pub fn expiry(mut self, expiry: MqLong) -> Self {
        self.descriptor.expiry = expiry;
        self
    }

    /// Message identifier
    pub fn msg_id(mut self, msg_id: MessageId) -> Self {
        self.descriptor.msg_id = msg_id;
        self
    }

    /// Correlation identifier
    pub fn correl_id(mut self, correl_id: MessageId) -> Self {
        self.descriptor.correl_id = correl_id;
        self
    }

    /// Reply queue and reply queue manager
    pub fn reply_to(mut self, q_name: impl Into<String>, q_mgr_name: impl Into<String>) -> Self {
        self.descriptor.reply_to_q = q_name.into();
        self.descriptor.reply_to_q_mgr = q_mgr_name.into();
        self
    }

    /// Appends a header to the chain
    pub fn header(mut self, header: impl Into<Header>) -> Self {
        self.headers.push(header.into());
        self
    }

    /// Application data
    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Builds the message
    pub fn build(self) -> Message {
        Message {
            descriptor: self.descriptor,
            headers: self.headers,
            data: self.data,
        }
    }
}
