//! Errors of the binding

use wmq_types::{options::UnknownName, CompletionCode, DecodeError, NotARequest, ReasonClass, ReasonCode};

/// How an [`Error`] should be treated by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The condition may clear; retrying with backoff is reasonable
    Transient,

    /// Configuration, authorization or data problem; retrying will not help
    Permanent,

    /// The caller used the API incorrectly
    ProtocolViolation,
}

/// Errors of the binding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A native call failed
    #[error("{operation} failed: {completion}, {reason}")]
    Mq {
        /// Name of the failing operation
        operation: &'static str,
        /// Completion code
        completion: CompletionCode,
        /// Reason code
        reason: ReasonCode,
    },

    /// The queue manager handle is not connected
    #[error("Queue manager is not connected")]
    NotConnected,

    /// The queue handle is not open
    #[error("Queue is not open")]
    NotOpen,

    /// Browse or cursor flags were used out of order
    #[error("Invalid sequence: {0}")]
    InvalidSequence(&'static str),

    /// A reply was requested for a message that is not a request
    #[error(transparent)]
    NotARequest(#[from] NotARequest),

    /// A received buffer could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An attribute, command or transport name is not known
    #[error(transparent)]
    UnknownName(#[from] UnknownName),

    /// An administrative command was given invalid parameters
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// The connection or queue configuration is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn mq(operation: &'static str, completion: CompletionCode, reason: ReasonCode) -> Self {
        Self::Mq {
            operation,
            completion,
            reason,
        }
    }

    /// Classifies the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Mq { reason, .. } => match reason.class() {
                ReasonClass::Transient => ErrorKind::Transient,
                _ => ErrorKind::Permanent,
            },
            Error::Decode(_) | Error::Config(_) => ErrorKind::Permanent,
            Error::NotConnected
            | Error::NotOpen
            | Error::InvalidSequence(_)
            | Error::NotARequest(_)
            | Error::UnknownName(_)
            | Error::InvalidCommand(_) => ErrorKind::ProtocolViolation,
        }
    }

    /// Whether retrying the operation later may succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Reason code of a native failure
    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            Error::Mq { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Completion code of a native failure
    pub fn comp_code(&self) -> Option<CompletionCode> {
        match self {
            Error::Mq { completion, .. } => Some(*completion),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let broken = Error::mq("get", CompletionCode::Failed, ReasonCode::CONNECTION_BROKEN);
        assert_eq!(broken.kind(), ErrorKind::Transient);
        assert!(broken.is_retryable());
        assert_eq!(broken.reason_code(), Some(ReasonCode::CONNECTION_BROKEN));

        let unknown = Error::mq("open", CompletionCode::Failed, ReasonCode::UNKNOWN_OBJECT_NAME);
        assert_eq!(unknown.kind(), ErrorKind::Permanent);
        assert!(!unknown.is_retryable());

        assert_eq!(
            Error::InvalidSequence("browse next before browse first").kind(),
            ErrorKind::ProtocolViolation
        );
        assert_eq!(
            Error::from(NotARequest { msg_type: 8 }).kind(),
            ErrorKind::ProtocolViolation
        );
        assert_eq!(
            Error::from(DecodeError::UnsupportedHeader("MQHCIH".into())).kind(),
            ErrorKind::Permanent
        );
    }

    #[test]
    fn display_names_operation_and_reason() {
        let err = Error::mq("put", CompletionCode::Failed, ReasonCode::Q_FULL);
        assert_eq!(err.to_string(), "put failed: MQCC_FAILED, MQRC_Q_FULL (2053)");
    }
}
