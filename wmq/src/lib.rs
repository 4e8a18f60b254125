#![deny(missing_docs, missing_debug_implementations)]

//! A synchronous, handle-based binding to the WebSphere MQ client interface.
//!
//! A [`QueueManager`] owns a native connection and every [`Queue`] borrows the
//! connection it was opened from. All calls block on the calling thread and
//! report their outcome through a completion code and a reason code.
//!
//! Failed calls are returned as [`Error`] when `exception_on_error` is set,
//! which is the default, and as `Ok(false)` otherwise. A get that finds no
//! message always returns `Ok(false)`.
//!
//! # Example
//!
//! ```rust
//! use wmq::{local::LocalQueueManager, queue, PutParams, QueueManager};
//! use wmq::types::{options::GetOptions, Message};
//!
//! let qmgr = LocalQueueManager::new("QM1");
//! QueueManager::<&LocalQueueManager>::builder()
//!     .q_mgr_name("QM1")
//!     .connect_with(&qmgr, |conn| {
//!         let mut queue = conn.open_queue(
//!             queue::Builder::new("SYSTEM.DEFAULT.LOCAL.QUEUE").mode(queue::Mode::InputShared),
//!         )?;
//!         conn.put("SYSTEM.DEFAULT.LOCAL.QUEUE", &mut Message::with_data("hello"), &PutParams::new())?;
//!
//!         let mut message = Message::new();
//!         assert!(queue.get(&mut message, &GetOptions::default())?);
//!         assert_eq!(message.data, b"hello");
//!         Ok::<_, wmq::Error>(())
//!     })
//!     .unwrap();
//! ```

// Public mods
pub mod command;
pub mod connection;
pub mod error;
pub mod mqi;
pub mod put;
pub mod queue;

#[cfg_attr(docsrs, doc(cfg(feature = "local")))]
#[cfg(feature = "local")]
pub mod local;

#[cfg_attr(docsrs, doc(cfg(feature = "native")))]
#[cfg(feature = "native")]
pub mod native;

// Private mods
mod routing;

pub use connection::QueueManager;
pub use error::{Error, ErrorKind};
pub use put::PutParams;
pub use queue::Queue;

/// Re-export of the wire-level types
pub use wmq_types as types;
