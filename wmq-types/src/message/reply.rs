use crate::{
    constants::{MqLong, DEFAULT_DEAD_LETTER_Q_NAME, MQMT_REPLY, MQRO_PASS_CORREL_ID, MQRO_PASS_MSG_ID},
    destination::Destination,
    error::NotARequest,
    header::{DeadLetterHeader, Header},
};

use super::Message;

impl Message {
    /// Turns `reply` into the reply to this request and returns where it must
    /// be sent.
    ///
    /// The reply takes its expiry, priority, persistence and format from the
    /// request. Its correlation identifier is the request's correlation
    /// identifier when the request asked for `MQRO_PASS_CORREL_ID`, and the
    /// request's message identifier otherwise. The message identifier is only
    /// copied under `MQRO_PASS_MSG_ID`. Headers of the request that are not
    /// input-only are placed in front of the reply's own headers.
    ///
    /// `reply` is left untouched when this message is not a request.
    pub fn build_reply(&self, reply: &mut Message) -> Result<Destination, NotARequest> {
        let request = &self.descriptor;
        if !request.is_request() {
            return Err(NotARequest {
                msg_type: request.msg_type,
            });
        }

        let md = &mut reply.descriptor;
        md.msg_type = MQMT_REPLY;
        md.expiry = request.expiry;
        md.priority = request.priority;
        md.persistence = request.persistence;
        md.format = request.format;

        md.correl_id = if request.report & MQRO_PASS_CORREL_ID != 0 {
            request.correl_id
        } else {
            request.msg_id
        };
        if request.report & MQRO_PASS_MSG_ID != 0 {
            md.msg_id = request.msg_id;
        }

        let propagated = self
            .headers
            .iter()
            .filter(|header| !header.is_input_only())
            .cloned();
        let own = std::mem::take(&mut reply.headers);
        reply.headers = propagated.chain(own).collect();

        Ok(Destination::remote(
            request.reply_to_q.clone(),
            request.reply_to_q_mgr.clone(),
        ))
    }

    /// Prepends a dead-letter header recording `reason` and the original
    /// destination, and returns the well-known dead-letter queue as the new
    /// destination. Existing headers and the data are left unchanged.
    pub fn build_dead_letter(
        &mut self,
        reason: MqLong,
        dest_q_name: impl Into<String>,
        dest_q_mgr_name: impl Into<String>,
    ) -> Destination {
        let dlh = DeadLetterHeader {
            reason,
            dest_q_name: dest_q_name.into(),
            dest_q_mgr_name: dest_q_mgr_name.into(),
            ..Default::default()
        };
        self.headers.insert(0, Header::DeadLetter(dlh));
        Destination::new(DEFAULT_DEAD_LETTER_Q_NAME)
    }
}
