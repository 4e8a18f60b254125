//! Queue handles

use std::collections::BTreeMap;

use wmq_types::{
    constants::{MqLong, MQGMO_FAIL_IF_QUIESCING},
    options::{AttributeValue, GetOptions, PutOptions, Selector},
    CompletionCode, Destination, Message, MessageDescriptor, ReasonCode,
};

use crate::{
    connection::{check_status, QueueManager},
    error::Error,
    mqi::{Hobj, Mqi, Status},
    put::{self, PutParams},
};

mod browse;
pub use browse::*;

mod builder;
pub use builder::*;

/// Initial receive buffer of a get. The buffer grows to the length of the
/// largest message received on the handle.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// An open queue
///
/// The handle borrows the [`QueueManager`] it was opened from and therefore
/// cannot outlive the connection. Dropping an open handle closes it.
#[derive(Debug)]
pub struct Queue<'c, M: Mqi> {
    queue_manager: &'c QueueManager<M>,
    config: Builder,
    hobj: Option<Hobj>,
    open_options: MqLong,
    name: String,
    status: Status,
    cursor: Cursor,
    buffer_size: usize,
}

impl<'c, M: Mqi> Queue<'c, M> {
    /// Creates a closed handle on `queue_manager`
    pub fn new(queue_manager: &'c QueueManager<M>, config: Builder) -> Self {
        let name = config.q_name.clone();
        Self {
            queue_manager,
            config,
            hobj: None,
            open_options: 0,
            name,
            status: Status::OK,
            cursor: Cursor::Unpositioned,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    fn check(&mut self, operation: &'static str, status: Status) -> Result<bool, Error> {
        self.status = status;
        check_status(
            operation,
            status,
            self.queue_manager.exception_on_error(),
            self.queue_manager.trace_level(),
        )
    }

    fn hobj(&self) -> Result<Hobj, Error> {
        self.hobj.ok_or(Error::NotOpen)
    }

    /// Opens the queue. Opening an open handle does nothing.
    ///
    /// When a model queue is opened the handle takes the name of the dynamic
    /// queue that was created. If that name already exists and
    /// `fail_if_exists` is `false`, the existing queue is opened instead.
    pub fn open(&mut self) -> Result<bool, Error> {
        if self.hobj.is_some() {
            return Ok(true);
        }
        let hconn = self.queue_manager.hconn()?;
        let options = self.config.resolve_open_options()?;
        let trace_level = self.queue_manager.trace_level();
        if trace_level >= 2 {
            #[cfg(feature = "tracing")]
            tracing::debug!(q_name = %self.config.q_name, options, "Opening queue");
            #[cfg(feature = "log")]
            log::debug!("Opening queue {} with options {:#x}", self.config.q_name, options);
        }

        let mqi = self.queue_manager.mqi();
        let mut od = self.config.object_descriptor();
        let mut hobj = Hobj::UNUSABLE;
        let mut status = mqi.open(hconn, &mut od, options, &mut hobj);

        if status.reason == ReasonCode::OBJECT_ALREADY_EXISTS && !self.config.fail_if_exists {
            if let Some(dynamic_q_name) = self.config.dynamic_q_name.clone() {
                if trace_level >= 2 {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(q_name = %dynamic_q_name, "Dynamic queue exists, reopening");
                    #[cfg(feature = "log")]
                    log::debug!("Dynamic queue {} exists, reopening", dynamic_q_name);
                }
                od = self.config.object_descriptor();
                od.object_name = dynamic_q_name;
                od.object_q_mgr_name.clear();
                status = mqi.open(hconn, &mut od, options, &mut hobj);
            }
        }

        if !status.is_failed() {
            self.hobj = Some(hobj);
            self.open_options = options;
            self.name = od.object_name;
            self.cursor = Cursor::Unpositioned;
        }
        self.check("open", status)
    }

    pub(crate) fn open_or_err(&mut self) -> Result<(), Error> {
        match self.open()? {
            true => Ok(()),
            false => Err(Error::mq("open", self.status.completion, self.status.reason)),
        }
    }

    /// Closes the queue with the configured close options. Closing a closed
    /// handle does nothing.
    pub fn close(&mut self) -> Result<bool, Error> {
        let mut hobj = match self.hobj {
            Some(hobj) => hobj,
            None => return Ok(true),
        };
        let hconn = self.queue_manager.hconn()?;
        let status = self
            .queue_manager
            .mqi()
            .close(hconn, &mut hobj, self.config.close_options);
        if !status.is_failed() {
            self.hobj = None;
            self.cursor = Cursor::Unpositioned;
        }
        self.check("close", status)
    }

    /// Gets a message into `message`, replacing its descriptor, headers and
    /// data.
    ///
    /// Returns `Ok(false)` when no message is available, whatever the error
    /// policy; the status then reads `MQCC_WARNING` / `MQRC_NO_MSG_AVAILABLE`.
    /// Browsing from the cursor requires a prior browse first on this handle.
    pub fn get(&mut self, message: &mut Message, options: &GetOptions) -> Result<bool, Error> {
        let hobj = self.hobj()?;
        let hconn = self.queue_manager.hconn()?;
        self.cursor.check(self.open_options, options.options)?;

        let mut gmo = options.clone();
        if self.config.fail_if_quiescing {
            gmo.options |= MQGMO_FAIL_IF_QUIESCING;
        }

        let mqi = self.queue_manager.mqi();
        let mut buffer = vec![0u8; self.buffer_size];
        let (status, md, data_length) = loop {
            let mut md = MessageDescriptor::default();
            let mut data_length = 0;
            let status = mqi.get(hconn, hobj, &mut md, &mut gmo, &mut buffer, &mut data_length);
            if status.reason == ReasonCode::TRUNCATED_MSG_FAILED && data_length > buffer.len() {
                if self.queue_manager.trace_level() >= 2 {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(from = buffer.len(), to = data_length, "Growing receive buffer");
                    #[cfg(feature = "log")]
                    log::debug!("Growing receive buffer from {} to {}", buffer.len(), data_length);
                }
                self.buffer_size = data_length;
                buffer.resize(data_length, 0);
                continue;
            }
            break (status, md, data_length);
        };

        if status.reason == ReasonCode::NO_MSG_AVAILABLE {
            self.cursor.advance(gmo.options, false);
            let _ = self.check("get", Status::warning(ReasonCode::NO_MSG_AVAILABLE));
            return Ok(false);
        }
        if status.is_failed() {
            return self.check("get", status);
        }

        let received = data_length.min(buffer.len());
        // The message is consumed or browsed whether or not it decodes
        self.cursor.advance(gmo.options, true);
        let decoded = Message::decode_payload(md, &buffer[..received]);
        self.check("get", status)?;
        *message = decoded?;
        Ok(true)
    }

    /// Iterates over the messages of the queue until none is available.
    ///
    /// On a browse handle, or when `options` carries a browse flag, the
    /// iterator browses: browse first, then browse next. Otherwise messages
    /// are removed from the queue.
    pub fn messages(&mut self, options: GetOptions) -> Messages<'_, 'c, M> {
        Messages::new(self, options)
    }

    /// Puts `message` on the queue. On success the descriptor carries the
    /// fields assigned by the queue manager.
    pub fn put(&mut self, message: &mut Message, params: &PutParams) -> Result<bool, Error> {
        let hobj = self.hobj()?;
        let hconn = self.queue_manager.hconn()?;
        let (mut md, payload) = put::prepare(message);
        let mut pmo: PutOptions = params.to_pmo();
        put::trace(self.queue_manager.trace_level(), &self.name, &md, payload.len());

        let status = self
            .queue_manager
            .mqi()
            .put(hconn, hobj, &mut md, &mut pmo, &payload);
        if !status.is_failed() {
            put::write_back(message, md);
        }
        self.check("put", status)
    }

    /// Inquires queue attributes. The queue must be open with
    /// `MQOO_INQUIRE`. Failures are always returned as `Err`.
    pub fn inquire(
        &mut self,
        selectors: &[Selector],
    ) -> Result<BTreeMap<Selector, AttributeValue>, Error> {
        let hobj = self.hobj()?;
        let hconn = self.queue_manager.hconn()?;
        let mut values = Vec::with_capacity(selectors.len());
        let status = self
            .queue_manager
            .mqi()
            .inq(hconn, hobj, selectors, &mut values);
        self.status = status;
        if status.is_failed() {
            return Err(Error::mq("inquire", status.completion, status.reason));
        }
        if values.len() != selectors.len() {
            self.status = Status::failed(ReasonCode::SELECTOR_COUNT_ERROR);
            return Err(Error::mq(
                "inquire",
                CompletionCode::Failed,
                ReasonCode::SELECTOR_COUNT_ERROR,
            ));
        }
        Ok(selectors.iter().copied().zip(values).collect())
    }

    /// Inquires queue attributes by name, e.g. `"current_q_depth"`
    pub fn inquire_names(
        &mut self,
        names: &[&str],
    ) -> Result<BTreeMap<String, AttributeValue>, Error> {
        let selectors = names
            .iter()
            .map(|name| name.parse::<Selector>())
            .collect::<Result<Vec<_>, _>>()?;
        let values = self.inquire(&selectors)?;
        Ok(values
            .into_iter()
            .map(|(selector, value)| (selector.name().to_string(), value))
            .collect())
    }

    /// Name of the queue. After opening a model queue this is the name of
    /// the dynamic queue.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target of the open
    pub fn destination(&self) -> Destination {
        self.config.destination()
    }

    /// Resolved open options, zero while closed and never opened
    pub fn open_options(&self) -> MqLong {
        self.open_options
    }

    /// Whether the handle holds a native object
    pub fn is_open(&self) -> bool {
        self.hobj.is_some()
    }

    /// Current browse cursor position
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Completion code of the last operation
    pub fn comp_code(&self) -> CompletionCode {
        self.status.completion
    }

    /// Reason code of the last operation
    pub fn reason_code(&self) -> ReasonCode {
        self.status.reason
    }

    /// Symbolic name of the reason code of the last operation
    pub fn reason(&self) -> &'static str {
        self.status.reason.name()
    }
}

impl<'c, M: Mqi> Drop for Queue<'c, M> {
    fn drop(&mut self) {
        if self.hobj.is_some() {
            if let Err(_err) = self.close() {
                #[cfg(feature = "tracing")]
                tracing::warn!(q_name = %self.name, error = ?_err, "Closing dropped queue failed");
                #[cfg(feature = "log")]
                log::warn!("Closing dropped queue {} failed: {:?}", self.name, _err);
            }
        }
    }
}
