#![deny(missing_docs, missing_debug_implementations)]

//! Wire-level types of the WebSphere MQ client interface: constants, the
//! completion and reason codes, the message descriptor, header records, the
//! message model and the option records of the native calls.

#[macro_use]
mod macros;

pub mod constants;
pub mod descriptor;
pub mod header;
pub mod message;
pub mod options;
pub mod reason;

mod codec;
mod destination;
mod error;
mod format;

pub use descriptor::{MessageDescriptor, MessageId};
pub use destination::Destination;
pub use error::{DecodeError, NotARequest};
pub use format::Format;
pub use header::Header;
pub use message::Message;
pub use reason::{CompletionCode, ReasonClass, ReasonCode};
