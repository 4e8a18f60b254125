//! Reply and dead-letter routing on a connection

use wmq_types::{constants::MqLong, Message};

use crate::{connection::QueueManager, error::Error, mqi::Mqi, put::PutParams};

impl<M: Mqi> QueueManager<M> {
    /// Turns `reply` into the reply to `request` and puts it on the request's
    /// reply queue.
    ///
    /// Fails with [`Error::NotARequest`] when `request` is not a request;
    /// `reply` is left untouched in that case.
    pub fn put_to_reply_q(
        &self,
        request: &Message,
        reply: &mut Message,
        params: &PutParams,
    ) -> Result<bool, Error> {
        let destination = request.build_reply(reply)?;
        if self.trace_level() >= 2 {
            #[cfg(feature = "tracing")]
            tracing::debug!(destination = %destination, "Routing reply");
            #[cfg(feature = "log")]
            log::debug!("Routing reply to {}", destination);
        }
        self.put(destination, reply, params)
    }

    /// Prepends a dead-letter header recording `reason` and the original
    /// destination `q_name` on this queue manager, then puts `message` on the
    /// configured dead-letter queue.
    ///
    /// The header stays on `message` whether or not the put succeeds.
    pub fn put_to_dead_letter_q(
        &self,
        message: &mut Message,
        reason: MqLong,
        q_name: &str,
        params: &PutParams,
    ) -> Result<bool, Error> {
        let mut destination = message.build_dead_letter(reason, q_name, self.name());
        destination.q_name = self.dead_letter_q_name().to_string();
        if self.trace_level() >= 2 {
            #[cfg(feature = "tracing")]
            tracing::debug!(destination = %destination, reason, q_name, "Routing to dead-letter queue");
            #[cfg(feature = "log")]
            log::debug!(
                "Routing message for {} to dead-letter queue {}, reason {}",
                q_name,
                destination,
                reason
            );
        }
        self.put(destination, message, params)
    }
}
