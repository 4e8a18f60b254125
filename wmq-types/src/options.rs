//! Option records passed to the native calls

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{constants::*, descriptor::MessageId};

/// Object descriptor (`MQOD`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDescriptor {
    /// Object type
    pub object_type: MqLong,
    /// Object name. After a successful open of a model queue this holds the
    /// name of the dynamic queue that was created.
    pub object_name: String,
    /// Object queue manager name
    pub object_q_mgr_name: String,
    /// Template for the name of a dynamic queue
    pub dynamic_q_name: String,
    /// Alternate user identifier
    pub alternate_user_id: String,
    /// Alternate security identifier
    #[serde(with = "serde_bytes")]
    pub alternate_security_id: Vec<u8>,
    /// Resolved queue name, set by the queue manager
    pub resolved_q_name: String,
    /// Resolved queue manager name, set by the queue manager
    pub resolved_q_mgr_name: String,
}

impl Default for ObjectDescriptor {
    fn default() -> Self {
        Self {
            object_type: MQOT_Q,
            object_name: String::new(),
            object_q_mgr_name: String::new(),
            dynamic_q_name: "AMQ.*".to_string(),
            alternate_user_id: String::new(),
            alternate_security_id: Vec::new(),
            resolved_q_name: String::new(),
            resolved_q_mgr_name: String::new(),
        }
    }
}

/// Get-message options (`MQGMO`) together with the identifiers to match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetOptions {
    /// `MQGMO_*` flags
    pub options: MqLong,
    /// Wait interval in milliseconds. Zero does not wait, `MQWI_UNLIMITED`
    /// waits indefinitely. Only honoured with `MQGMO_WAIT`.
    pub wait_interval: MqLong,
    /// `MQMO_*` flags
    pub match_options: MqLong,
    /// Message identifier to match, `MQMI_NONE` matches any
    pub msg_id: MessageId,
    /// Correlation identifier to match, `MQCI_NONE` matches any
    pub correl_id: MessageId,
    /// Name of the queue the message was retrieved from, set on return
    pub resolved_q_name: String,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            options: MQGMO_NO_WAIT,
            wait_interval: 0,
            match_options: MQMO_MATCH_MSG_ID | MQMO_MATCH_CORREL_ID,
            msg_id: MQMI_NONE,
            correl_id: MQCI_NONE,
            resolved_q_name: String::new(),
        }
    }
}

impl GetOptions {
    /// Waits up to `wait_interval` milliseconds for a message
    pub fn wait(mut self, wait_interval: MqLong) -> Self {
        self.options |= MQGMO_WAIT;
        self.wait_interval = wait_interval;
        self
    }

    /// Adds `MQGMO_*` flags
    pub fn with(mut self, options: MqLong) -> Self {
        self.options |= options;
        self
    }

    /// Whether any browse flag is set
    pub fn is_browse(&self) -> bool {
        self.options & MQGMO_BROWSE_ANY != 0
    }
}

/// Put-message options (`MQPMO`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PutOptions {
    /// `MQPMO_*` flags
    pub options: MqLong,
    /// Resolved queue name, set on return
    pub resolved_q_name: String,
    /// Resolved queue manager name, set on return
    pub resolved_q_mgr_name: String,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            options: MQPMO_NONE,
            resolved_q_name: String::new(),
            resolved_q_mgr_name: String::new(),
        }
    }
}

/// Transport used by a client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportType {
    /// `MQXPT_LOCAL`
    Local,
    /// `MQXPT_LU62`
    Lu62,
    /// `MQXPT_TCP`
    #[default]
    Tcp,
    /// `MQXPT_NETBIOS`
    NetBios,
    /// `MQXPT_SPX`
    Spx,
    /// `MQXPT_DECNET`
    DecNet,
    /// `MQXPT_UDP`
    Udp,
}

impl TransportType {
    /// The raw `MQXPT_*` value
    pub fn as_raw(&self) -> MqLong {
        match self {
            TransportType::Local => MQXPT_LOCAL,
            TransportType::Lu62 => MQXPT_LU62,
            TransportType::Tcp => MQXPT_TCP,
            TransportType::NetBios => MQXPT_NETBIOS,
            TransportType::Spx => MQXPT_SPX,
            TransportType::DecNet => MQXPT_DECNET,
            TransportType::Udp => MQXPT_UDP,
        }
    }
}

/// Error returned when a name does not designate a known value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} {name:?}")]
pub struct UnknownName {
    /// What was being parsed
    pub kind: &'static str,
    /// The offending name
    pub name: String,
}

impl FromStr for TransportType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOCAL" => Ok(Self::Local),
            "LU62" => Ok(Self::Lu62),
            "TCP" => Ok(Self::Tcp),
            "NETBIOS" => Ok(Self::NetBios),
            "SPX" => Ok(Self::Spx),
            "DECNET" => Ok(Self::DecNet),
            "UDP" => Ok(Self::Udp),
            _ => Err(UnknownName {
                kind: "transport type",
                name: s.to_string(),
            }),
        }
    }
}

/// Client channel definition (`MQCD`), the subset a client connection uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelDefinition {
    /// Channel name
    pub channel_name: String,
    /// Comma separated list of `host` or `host(port)`
    pub connection_name: String,
    /// Transport type
    pub transport_type: TransportType,
    /// Maximum message length
    pub max_msg_length: Option<MqLong>,
    /// Security exit name
    pub security_exit: Option<String>,
    /// Send exit name
    pub send_exit: Option<String>,
    /// Receive exit name
    pub receive_exit: Option<String>,
    /// Security exit user data
    pub security_user_data: Option<String>,
    /// Send exit user data
    pub send_user_data: Option<String>,
    /// Receive exit user data
    pub receive_user_data: Option<String>,
    /// Heartbeat interval in seconds
    pub heartbeat_interval: Option<MqLong>,
    /// Keep-alive interval in seconds
    pub keep_alive_interval: Option<MqLong>,
    /// Remote security identifier
    pub remote_security_id: Option<String>,
    /// SSL cipher specification
    pub ssl_cipher_spec: Option<String>,
    /// Distinguished name pattern of the peer certificate
    pub ssl_peer_name: Option<String>,
    /// LU 6.2 mode name
    pub mode_name: Option<String>,
    /// LU 6.2 transaction program name
    pub tp_name: Option<String>,
    /// User identifier
    pub user_identifier: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Long remote user identifier
    pub long_remote_user_id: Option<String>,
}

impl Default for ChannelDefinition {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            connection_name: String::new(),
            transport_type: TransportType::Tcp,
            max_msg_length: None,
            security_exit: None,
            send_exit: None,
            receive_exit: None,
            security_user_data: None,
            send_user_data: None,
            receive_user_data: None,
            heartbeat_interval: None,
            keep_alive_interval: None,
            remote_security_id: None,
            ssl_cipher_spec: None,
            ssl_peer_name: None,
            mode_name: None,
            tp_name: None,
            user_identifier: None,
            password: None,
            long_remote_user_id: None,
        }
    }
}

/// SSL configuration options (`MQSCO`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SslConfiguration {
    /// Location of the key repository
    pub key_repository: Option<String>,
    /// Cryptographic hardware configuration string
    pub crypto_hardware: Option<String>,
}

/// Connect options (`MQCNO`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectOptions {
    /// `MQCNO_*` flags
    pub options: MqLong,
    /// Channel definition of a client connection; absent for a local binding
    pub client: Option<ChannelDefinition>,
    /// SSL configuration of a client connection
    pub ssl: Option<SslConfiguration>,
}

impl ConnectOptions {
    /// Whether the connection is made over a client channel
    pub fn is_client(&self) -> bool {
        self.client.is_some()
    }
}

macro_rules! selectors {
    ($($variant:ident => ($raw:ident, $name:literal, $doc:literal)),* $(,)?) => {
        /// Queue attribute that can be inquired
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Selector {
            $(
                #[doc = $doc]
                $variant,
            )*
        }

        impl Selector {
            /// Every selector
            pub const ALL: &'static [Selector] = &[$(Selector::$variant),*];

            /// The raw `MQIA_*` or `MQCA_*` value
            pub fn as_raw(&self) -> MqLong {
                match self {
                    $(Selector::$variant => $raw,)*
                }
            }

            /// Attribute name
            pub fn name(&self) -> &'static str {
                match self {
                    $(Selector::$variant => $name,)*
                }
            }

            /// Looks up a selector by its raw value
            pub fn from_raw(raw: MqLong) -> Option<Self> {
                match raw {
                    $($raw => Some(Selector::$variant),)*
                    _ => None,
                }
            }
        }

        impl FromStr for Selector {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Selector::$variant),)*
                    _ => Err(UnknownName { kind: "selector", name: s.to_string() }),
                }
            }
        }
    };
}

selectors! {
    CurrentQDepth => (MQIA_CURRENT_Q_DEPTH, "current_q_depth", "Number of messages on the queue"),
    DefInputOpenOption => (MQIA_DEF_INPUT_OPEN_OPTION, "def_input_open_option", "Default input open option"),
    DefPersistence => (MQIA_DEF_PERSISTENCE, "def_persistence", "Default persistence"),
    DefPriority => (MQIA_DEF_PRIORITY, "def_priority", "Default priority"),
    DefinitionType => (MQIA_DEFINITION_TYPE, "definition_type", "Queue definition type"),
    InhibitGet => (MQIA_INHIBIT_GET, "inhibit_get", "Whether get operations are allowed"),
    InhibitPut => (MQIA_INHIBIT_PUT, "inhibit_put", "Whether put operations are allowed"),
    MaxMsgLength => (MQIA_MAX_MSG_LENGTH, "max_msg_length", "Maximum message length"),
    MaxQDepth => (MQIA_MAX_Q_DEPTH, "max_q_depth", "Maximum queue depth"),
    OpenInputCount => (MQIA_OPEN_INPUT_COUNT, "open_input_count", "Number of handles open for input"),
    OpenOutputCount => (MQIA_OPEN_OUTPUT_COUNT, "open_output_count", "Number of handles open for output"),
    QType => (MQIA_Q_TYPE, "q_type", "Queue type"),
    Shareability => (MQIA_SHAREABILITY, "shareability", "Whether the queue can be shared for input"),
    QDesc => (MQCA_Q_DESC, "q_desc", "Queue description"),
    QName => (MQCA_Q_NAME, "q_name", "Queue name"),
}

impl Selector {
    /// Whether the attribute is a character attribute
    pub fn is_string(&self) -> bool {
        self.as_raw() >= 2001
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of an inquired attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Integer attribute
    Integer(MqLong),
    /// Character attribute
    String(String),
}

impl AttributeValue {
    /// The integer value, if this is an integer attribute
    pub fn as_integer(&self) -> Option<MqLong> {
        match self {
            AttributeValue::Integer(value) => Some(*value),
            AttributeValue::String(_) => None,
        }
    }

    /// The string value, if this is a character attribute
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Integer(_) => None,
            AttributeValue::String(value) => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_names() {
        assert_eq!("current_q_depth".parse::<Selector>().unwrap(), Selector::CurrentQDepth);
        assert_eq!(Selector::MaxQDepth.as_raw(), MQIA_MAX_Q_DEPTH);
        assert_eq!(Selector::from_raw(MQCA_Q_NAME), Some(Selector::QName));
        assert!(Selector::QDesc.is_string());
        assert!(!Selector::CurrentQDepth.is_string());
        assert!("depth".parse::<Selector>().is_err());
        assert_eq!(Selector::ALL.len(), 15);
    }

    #[test]
    fn transport_type_parsing() {
        assert_eq!("tcp".parse::<TransportType>().unwrap(), TransportType::Tcp);
        assert_eq!("LU62".parse::<TransportType>().unwrap(), TransportType::Lu62);
        assert_eq!(TransportType::Udp.as_raw(), MQXPT_UDP);
        assert!("IPX".parse::<TransportType>().is_err());
    }

    #[test]
    fn get_options_builders() {
        let options = GetOptions::default().wait(5000).with(MQGMO_SYNCPOINT);
        assert_eq!(options.options, MQGMO_WAIT | MQGMO_SYNCPOINT);
        assert_eq!(options.wait_interval, 5000);
        assert!(!options.is_browse());
        assert!(GetOptions::default().with(MQGMO_BROWSE_NEXT).is_browse());
    }

    #[test]
    fn channel_definition_from_json() {
        let cd: ChannelDefinition = serde_json::from_str(
            r#"{ "connection_name": "localhost(1414)", "transport_type": "TCP" }"#,
        )
        .unwrap();
        assert_eq!(cd.channel_name, DEFAULT_CHANNEL_NAME);
        assert_eq!(cd.connection_name, "localhost(1414)");
        assert_eq!(cd.transport_type, TransportType::Tcp);
    }
}
