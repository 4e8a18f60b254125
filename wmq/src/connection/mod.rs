//! Queue manager connection

use std::cell::Cell;

use wmq_types::{
    options::{ObjectDescriptor, PutOptions},
    CompletionCode, Destination, Message, ReasonCode,
};

use crate::{
    command::{Command, Parameters, ESCAPE_TEXT},
    error::Error,
    mqi::{Hconn, Mqi, Status},
    put::{self, PutParams},
    queue::{self, Queue},
};

mod builder;
pub use builder::*;

/// A connection to one queue manager
///
/// The handle starts disconnected. The native connection token exists only
/// while connected. Dropping a connected handle backs out pending work and
/// disconnects; scoped use through [`Builder::connect_with`] is the primary
/// way to guarantee release.
///
/// The handle is not `Sync`: the native interface does not allow concurrent
/// calls on one connection.
#[derive(Debug)]
pub struct QueueManager<M: Mqi> {
    mqi: M,
    config: Builder,
    hconn: Option<Hconn>,
    status: Cell<Status>,
}

impl<M: Mqi> QueueManager<M> {
    /// Creates a disconnected handle
    pub fn new(mqi: M, mut config: Builder) -> Self {
        config.trace_level = config.trace_level.min(MAX_TRACE_LEVEL);
        Self {
            mqi,
            config,
            hconn: None,
            status: Cell::new(Status::OK),
        }
    }

    /// Creates a [`Builder`]
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn mqi(&self) -> &M {
        &self.mqi
    }

    pub(crate) fn hconn(&self) -> Result<Hconn, Error> {
        self.hconn.ok_or(Error::NotConnected)
    }

    pub(crate) fn trace_level(&self) -> u8 {
        self.config.trace_level
    }

    /// Records `status` as the outcome of `operation` and applies the
    /// error policy
    pub(crate) fn check(&self, operation: &'static str, status: Status) -> Result<bool, Error> {
        self.status.set(status);
        check_status(operation, status, self.config.exception_on_error, self.trace_level())
    }

    /// Connects to the queue manager. Connecting an already connected handle
    /// does nothing.
    pub fn connect(&mut self) -> Result<bool, Error> {
        if self.hconn.is_some() {
            return Ok(true);
        }
        let options = self.config.build_connect_options()?;

        if self.trace_level() >= 2 {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                q_mgr_name = %self.config.q_mgr_name,
                client = options.is_client(),
                "Connecting"
            );
            #[cfg(feature = "log")]
            log::debug!(
                "Connecting to {:?}, client = {}",
                self.config.q_mgr_name,
                options.is_client()
            );
        }

        let mut hconn = Hconn::UNUSABLE;
        let status = self.mqi.connx(&self.config.q_mgr_name, &options, &mut hconn);
        if !status.is_failed() {
            self.hconn = Some(hconn);
        }
        self.check("connect", status)
    }

    pub(crate) fn connect_or_err(&mut self) -> Result<(), Error> {
        match self.connect()? {
            true => Ok(()),
            false => {
                let status = self.status.get();
                Err(Error::mq("connect", status.completion, status.reason))
            }
        }
    }

    /// Disconnects from the queue manager. Disconnecting a handle that is not
    /// connected does nothing.
    ///
    /// The native disconnect commits any pending unit of work.
    ///
    /// The handle stays connected when the native disconnect fails and the
    /// native layer kept the connection, so the call can be retried.
    pub fn disconnect(&mut self) -> Result<bool, Error> {
        let mut hconn = match self.hconn {
            Some(hconn) => hconn,
            None => return Ok(true),
        };
        let status = self.mqi.disc(&mut hconn);
        if !status.is_failed() || hconn == Hconn::UNUSABLE {
            self.hconn = None;
        }
        self.check("disconnect", status)
    }

    /// Backs out and disconnects, reporting the first failure
    pub(crate) fn release(&mut self) -> Result<(), Error> {
        if self.hconn.is_none() {
            return Ok(());
        }
        let backout = self.backout();
        if let Err(_err) = &backout {
            #[cfg(feature = "tracing")]
            tracing::warn!(q_mgr_name = %self.name(), error = ?_err, "Backout before disconnect failed");
            #[cfg(feature = "log")]
            log::warn!("{}: Backout before disconnect failed: {:?}", self.name(), _err);
        }
        let disconnect = match self.disconnect() {
            Ok(true) => Ok(()),
            Ok(false) => {
                let status = self.status.get();
                Err(Error::mq("disconnect", status.completion, status.reason))
            }
            Err(err) => Err(err),
        };
        backout?;
        disconnect
    }

    /// Starts a unit of work coordinated by the queue manager
    pub fn begin(&self) -> Result<bool, Error> {
        let hconn = self.hconn()?;
        let status = self.mqi.begin(hconn);
        self.check("begin", status)
    }

    /// Commits every put and get made under syncpoint on this connection
    /// since the last commit or backout
    pub fn commit(&self) -> Result<bool, Error> {
        let hconn = self.hconn()?;
        let status = self.mqi.cmit(hconn);
        self.check("commit", status)
    }

    /// Backs out every put and get made under syncpoint on this connection
    /// since the last commit or backout
    pub fn backout(&self) -> Result<bool, Error> {
        let hconn = self.hconn()?;
        let status = self.mqi.back(hconn);
        self.check("backout", status)
    }

    /// Puts a single message without opening the queue first
    pub fn put(
        &self,
        destination: impl Into<Destination>,
        message: &mut Message,
        params: &PutParams,
    ) -> Result<bool, Error> {
        let hconn = self.hconn()?;
        let destination = destination.into();
        let mut od = ObjectDescriptor {
            object_name: destination.q_name.clone(),
            object_q_mgr_name: destination.q_mgr_name().to_string(),
            ..Default::default()
        };
        let (mut md, payload) = put::prepare(message);
        let mut pmo: PutOptions = params.to_pmo();
        put::trace(self.trace_level(), &destination.q_name, &md, payload.len());

        let status = self.mqi.put1(hconn, &mut od, &mut md, &mut pmo, &payload);
        if !status.is_failed() {
            put::write_back(message, md);
        }
        self.check("put", status)
    }

    /// Creates a queue handle for this connection and opens it. A failed
    /// open is always returned as `Err`.
    pub fn open_queue(&self, config: queue::Builder) -> Result<Queue<'_, M>, Error> {
        let mut queue = Queue::new(self, config);
        queue.open_or_err()?;
        Ok(queue)
    }

    /// Opens a queue, runs `f` with it and closes the queue on every exit
    /// path
    pub fn open_queue_with<F, T, E>(&self, config: queue::Builder, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Queue<'_, M>) -> Result<T, E>,
        E: From<Error>,
    {
        let mut queue = self.open_queue(config)?;
        let result = f(&mut queue);
        let closed = queue.close();
        match result {
            Ok(value) => {
                closed?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }

    /// Sends an administrative command and returns the response records.
    /// Failures are always returned as `Err`.
    pub fn execute(&self, command: &Command) -> Result<Vec<Parameters>, Error> {
        let hconn = self.hconn()?;
        if self.trace_level() >= 1 {
            #[cfg(feature = "tracing")]
            tracing::debug!(command = command.name(), "Executing command");
            #[cfg(feature = "log")]
            log::debug!("Executing command {}", command.name());
        }
        let mut responses = Vec::new();
        let status = self.mqi.execute(hconn, command, &mut responses);
        self.status.set(status);
        if status.is_failed() {
            return Err(Error::mq("execute", status.completion, status.reason));
        }
        Ok(responses)
    }

    /// Resolves `name` and `parameters` into a [`Command`] and executes it
    pub fn execute_command(
        &self,
        name: &str,
        parameters: &Parameters,
    ) -> Result<Vec<Parameters>, Error> {
        let command = Command::parse(name, parameters)?;
        self.execute(&command)
    }

    /// Executes MQSC command text and returns the response lines
    pub fn mqsc(&self, text: &str) -> Result<Vec<String>, Error> {
        let responses = self.execute(&Command::mqsc(text))?;
        Ok(responses
            .iter()
            .filter_map(|record| record.get(ESCAPE_TEXT))
            .filter_map(|value| value.as_str())
            .map(str::to_string)
            .collect())
    }

    /// Completion code of the last operation
    pub fn comp_code(&self) -> CompletionCode {
        self.status.get().completion
    }

    /// Reason code of the last operation
    pub fn reason_code(&self) -> ReasonCode {
        self.status.get().reason
    }

    /// Symbolic name of the reason code of the last operation
    pub fn reason(&self) -> &'static str {
        self.status.get().reason.name()
    }

    /// Whether the handle holds a native connection
    pub fn is_connected(&self) -> bool {
        self.hconn.is_some()
    }

    /// Configured queue manager name
    pub fn name(&self) -> &str {
        &self.config.q_mgr_name
    }

    /// Whether failed native calls return `Err`
    pub fn exception_on_error(&self) -> bool {
        self.config.exception_on_error
    }

    /// Dead-letter queue used by `put_to_dead_letter_q`
    pub fn dead_letter_q_name(&self) -> &str {
        &self.config.dead_letter_q_name
    }
}

impl<M: Mqi> Drop for QueueManager<M> {
    fn drop(&mut self) {
        if self.hconn.is_some() {
            #[cfg(feature = "tracing")]
            tracing::warn!(q_mgr_name = %self.config.q_mgr_name, "Dropping a connected queue manager, backing out and disconnecting");
            #[cfg(feature = "log")]
            log::warn!(
                "{}: Dropping a connected queue manager, backing out and disconnecting",
                self.config.q_mgr_name
            );
            if let Err(_err) = self.release() {
                #[cfg(feature = "tracing")]
                tracing::warn!(q_mgr_name = %self.config.q_mgr_name, error = ?_err, "Releasing dropped queue manager failed");
                #[cfg(feature = "log")]
                log::warn!(
                    "{}: Releasing dropped queue manager failed: {:?}",
                    self.config.q_mgr_name,
                    _err
                );
            }
        }
    }
}

/// Applies the error policy to the outcome of a native call
pub(crate) fn check_status(
    operation: &'static str,
    status: Status,
    exception_on_error: bool,
    _trace_level: u8,
) -> Result<bool, Error> {
    if _trace_level >= 1 {
        #[cfg(feature = "tracing")]
        tracing::debug!(operation, completion = %status.completion, reason = %status.reason);
        #[cfg(feature = "log")]
        log::debug!("{}: {}, {}", operation, status.completion, status.reason);
    }

    match status.completion {
        CompletionCode::Ok | CompletionCode::Warning => Ok(true),
        CompletionCode::Failed if exception_on_error => {
            Err(Error::mq(operation, status.completion, status.reason))
        }
        CompletionCode::Failed => Ok(false),
    }
}
