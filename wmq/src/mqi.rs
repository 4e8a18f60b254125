//! The native call interface
//!
//! [`Mqi`] mirrors the vendor entry points one to one. Every call reports a
//! [`Status`]; out-parameters are written through `&mut` references the same
//! way the native layer fills caller-owned structures. Implementations must
//! never panic on bad input and must report failures through the status.

use wmq_types::{
    constants::{MqLong, MQHC_UNUSABLE_HCONN, MQHO_UNUSABLE_HOBJ},
    options::{AttributeValue, ConnectOptions, GetOptions, ObjectDescriptor, PutOptions, Selector},
    CompletionCode, MessageDescriptor, ReasonCode,
};

use crate::command::{Command, Parameters};

/// Connection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hconn(pub MqLong);

impl Hconn {
    /// Handle that does not designate a connection
    pub const UNUSABLE: Hconn = Hconn(MQHC_UNUSABLE_HCONN);
}

/// Object handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hobj(pub MqLong);

impl Hobj {
    /// Handle that does not designate an object
    pub const UNUSABLE: Hobj = Hobj(MQHO_UNUSABLE_HOBJ);
}

/// Completion and reason code of a native call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status {
    /// Completion code
    pub completion: CompletionCode,
    /// Reason code
    pub reason: ReasonCode,
}

impl Default for Status {
    fn default() -> Self {
        Self::OK
    }
}

impl Status {
    /// `MQCC_OK` / `MQRC_NONE`
    pub const OK: Status = Status {
        completion: CompletionCode::Ok,
        reason: ReasonCode::NONE,
    };

    /// Warning completion with `reason`
    pub fn warning(reason: ReasonCode) -> Self {
        Self {
            completion: CompletionCode::Warning,
            reason,
        }
    }

    /// Failed completion with `reason`
    pub fn failed(reason: ReasonCode) -> Self {
        Self {
            completion: CompletionCode::Failed,
            reason,
        }
    }

    /// Whether the call failed
    pub fn is_failed(&self) -> bool {
        self.completion == CompletionCode::Failed
    }
}

/// The native message queue interface
pub trait Mqi {
    /// `MQCONNX`
    fn connx(&self, q_mgr_name: &str, options: &ConnectOptions, hconn: &mut Hconn) -> Status;

    /// `MQDISC`. Sets `hconn` to [`Hconn::UNUSABLE`] once the connection is
    /// released, which may happen together with a failure such as
    /// `MQRC_CONNECTION_BROKEN`.
    fn disc(&self, hconn: &mut Hconn) -> Status;

    /// `MQOPEN`. The object name of `od` is updated when a dynamic queue is
    /// created.
    fn open(&self, hconn: Hconn, od: &mut ObjectDescriptor, options: MqLong, hobj: &mut Hobj)
        -> Status;

    /// `MQCLOSE`. Sets `hobj` to [`Hobj::UNUSABLE`] on success.
    fn close(&self, hconn: Hconn, hobj: &mut Hobj, options: MqLong) -> Status;

    /// `MQPUT`
    fn put(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status;

    /// `MQPUT1`
    fn put1(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status;

    /// `MQGET`. The message and correlation identifiers to match are taken
    /// from `gmo`. `data_length` receives the full length of the message
    /// data even when `buffer` was too small.
    fn get(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        gmo: &mut GetOptions,
        buffer: &mut [u8],
        data_length: &mut usize,
    ) -> Status;

    /// `MQINQ`. `values` receives one value per selector, in order.
    fn inq(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        selectors: &[Selector],
        values: &mut Vec<AttributeValue>,
    ) -> Status;

    /// `MQBEGIN`
    fn begin(&self, hconn: Hconn) -> Status;

    /// `MQCMIT`
    fn cmit(&self, hconn: Hconn) -> Status;

    /// `MQBACK`
    fn back(&self, hconn: Hconn) -> Status;

    /// Sends an administrative command and collects the response records
    fn execute(&self, hconn: Hconn, command: &Command, responses: &mut Vec<Parameters>) -> Status;
}

impl<T: Mqi + ?Sized> Mqi for &T {
    fn connx(&self, q_mgr_name: &str, options: &ConnectOptions, hconn: &mut Hconn) -> Status {
        (**self).connx(q_mgr_name, options, hconn)
    }

    fn disc(&self, hconn: &mut Hconn) -> Status {
        (**self).disc(hconn)
    }

    fn open(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        options: MqLong,
        hobj: &mut Hobj,
    ) -> Status {
        (**self).open(hconn, od, options, hobj)
    }

    fn close(&self, hconn: Hconn, hobj: &mut Hobj, options: MqLong) -> Status {
        (**self).close(hconn, hobj, options)
    }

    fn put(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status {
        (**self).put(hconn, hobj, md, pmo, buffer)
    }

    fn put1(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status {
        (**self).put1(hconn, od, md, pmo, buffer)
    }

    fn get(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        gmo: &mut GetOptions,
        buffer: &mut [u8],
        data_length: &mut usize,
    ) -> Status {
        (**self).get(hconn, hobj, md, gmo, buffer, data_length)
    }

    fn inq(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        selectors: &[Selector],
        values: &mut Vec<AttributeValue>,
    ) -> Status {
        (**self).inq(hconn, hobj, selectors, values)
    }

    fn begin(&self, hconn: Hconn) -> Status {
        (**self).begin(hconn)
    }

    fn cmit(&self, hconn: Hconn) -> Status {
        (**self).cmit(hconn)
    }

    fn back(&self, hconn: Hconn) -> Status {
        (**self).back(hconn)
    }

    fn execute(&self, hconn: Hconn, command: &Command, responses: &mut Vec<Parameters>) -> Status {
        (**self).execute(hconn, command, responses)
    }
}
