//! Administrative commands
//!
//! Commands form a closed set. [`Command::parse`] resolves a command from an
//! explicit identifier and a parameter map, the shape used when commands come
//! from configuration or scripts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wmq_types::{
    constants::{MqLong, MQCMD_CLEAR_Q, MQCMD_ESCAPE, MQCMD_INQUIRE_Q_NAMES, MQCMD_PING_Q_MGR, MQET_MQSC},
    options::UnknownName,
};

use crate::error::Error;

/// Parameter name of the escape type
pub const ESCAPE_TYPE: &str = "escape_type";
/// Parameter name of the escape text, in requests and responses
pub const ESCAPE_TEXT: &str = "escape_text";
/// Parameter name of a queue name or generic queue name
pub const Q_NAME: &str = "q_name";
/// Parameter name of a queue type filter
pub const Q_TYPE: &str = "q_type";
/// Response parameter listing queue names
pub const Q_NAMES: &str = "q_names";

/// Value of a command or response parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Integer parameter
    Integer(MqLong),
    /// String parameter
    String(String),
    /// Integer list parameter
    IntegerList(Vec<MqLong>),
    /// String list parameter
    StringList(Vec<String>),
}

impl ParameterValue {
    /// The integer value, if any
    pub fn as_integer(&self) -> Option<MqLong> {
        match self {
            ParameterValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The string value, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// The string list, if any
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            ParameterValue::StringList(value) => Some(value),
            _ => None,
        }
    }
}

impl From<MqLong> for ParameterValue {
    fn from(value: MqLong) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for ParameterValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringList(value)
    }
}

/// Parameters of a command, or one response record
pub type Parameters = BTreeMap<String, ParameterValue>;

/// An administrative command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Passes command text of the given escape type to the command server
    Escape {
        /// `MQET_*`
        escape_type: MqLong,
        /// Command text
        escape_text: String,
    },

    /// Checks that the command server responds
    #[serde(rename = "ping_q_mgr")]
    PingQueueManager,

    /// Lists queue names matching a generic name
    #[serde(rename = "inquire_q_names")]
    InquireQueueNames {
        /// Queue name, optionally ending in `*`
        q_name: String,
        /// Restrict to one `MQQT_*` queue type
        #[serde(default)]
        q_type: Option<MqLong>,
    },

    /// Deletes every message on a local queue
    #[serde(rename = "clear_q")]
    ClearQueue {
        /// Queue name
        q_name: String,
    },
}

impl Command {
    /// MQSC command text
    pub fn mqsc(text: impl Into<String>) -> Self {
        Command::Escape {
            escape_type: MQET_MQSC,
            escape_text: text.into(),
        }
    }

    /// `MQCMD_*` code
    pub fn code(&self) -> MqLong {
        match self {
            Command::Escape { .. } => MQCMD_ESCAPE,
            Command::PingQueueManager => MQCMD_PING_Q_MGR,
            Command::InquireQueueNames { .. } => MQCMD_INQUIRE_Q_NAMES,
            Command::ClearQueue { .. } => MQCMD_CLEAR_Q,
        }
    }

    /// Command identifier as accepted by [`Command::parse`]
    pub fn name(&self) -> &'static str {
        match self {
            Command::Escape { .. } => "escape",
            Command::PingQueueManager => "ping_q_mgr",
            Command::InquireQueueNames { .. } => "inquire_q_names",
            Command::ClearQueue { .. } => "clear_q",
        }
    }

    /// Resolves a command from its identifier and parameters
    pub fn parse(name: &str, parameters: &Parameters) -> Result<Self, Error> {
        match name {
            "escape" => Ok(Command::Escape {
                escape_type: integer(parameters, ESCAPE_TYPE)?.unwrap_or(MQET_MQSC),
                escape_text: required_string(parameters, ESCAPE_TEXT)?,
            }),
            "ping_q_mgr" => Ok(Command::PingQueueManager),
            "inquire_q_names" => Ok(Command::InquireQueueNames {
                q_name: string(parameters, Q_NAME)?.unwrap_or_else(|| "*".to_string()),
                q_type: integer(parameters, Q_TYPE)?,
            }),
            "clear_q" => Ok(Command::ClearQueue {
                q_name: required_string(parameters, Q_NAME)?,
            }),
            _ => Err(UnknownName {
                kind: "command",
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// The command's parameters, the inverse of [`Command::parse`]
    pub fn parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        match self {
            Command::Escape {
                escape_type,
                escape_text,
            } => {
                parameters.insert(ESCAPE_TYPE.into(), (*escape_type).into());
                parameters.insert(ESCAPE_TEXT.into(), escape_text.as_str().into());
            }
            Command::PingQueueManager => {}
            Command::InquireQueueNames { q_name, q_type } => {
                parameters.insert(Q_NAME.into(), q_name.as_str().into());
                if let Some(q_type) = q_type {
                    parameters.insert(Q_TYPE.into(), (*q_type).into());
                }
            }
            Command::ClearQueue { q_name } => {
                parameters.insert(Q_NAME.into(), q_name.as_str().into());
            }
        }
        parameters
    }
}

fn integer(parameters: &Parameters, key: &'static str) -> Result<Option<MqLong>, Error> {
    match parameters.get(key) {
        None => Ok(None),
        Some(ParameterValue::Integer(value)) => Ok(Some(*value)),
        Some(_) => Err(Error::InvalidCommand(format!("{} must be an integer", key))),
    }
}

fn string(parameters: &Parameters, key: &'static str) -> Result<Option<String>, Error> {
    match parameters.get(key) {
        None => Ok(None),
        Some(ParameterValue::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(Error::InvalidCommand(format!("{} must be a string", key))),
    }
}

fn required_string(parameters: &Parameters, key: &'static str) -> Result<String, Error> {
    string(parameters, key)?.ok_or_else(|| Error::InvalidCommand(format!("{} is required", key)))
}
