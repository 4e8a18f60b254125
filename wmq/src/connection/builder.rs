use serde::Deserialize;
use wmq_types::{
    constants::{MqLong, DEFAULT_CHANNEL_NAME, DEFAULT_DEAD_LETTER_Q_NAME, MQCNO_NONE},
    options::{ChannelDefinition, ConnectOptions, SslConfiguration, TransportType},
};

use crate::{error::Error, mqi::Mqi};

use super::QueueManager;

/// Environment variable holding a client channel as
/// `CHANNEL/TRANSPORT/CONNECTION`
pub const MQSERVER: &str = "MQSERVER";

/// Highest diagnostic level
pub const MAX_TRACE_LEVEL: u8 = 3;

/// Connection configuration and builder for [`QueueManager`]
///
/// A client connection is made when `connection_name` is set or when
/// `use_system_connection_data` asks for the channel in `MQSERVER`.
/// Otherwise the connection uses the local binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Builder {
    /// Queue manager name. Empty selects the default queue manager.
    pub q_mgr_name: String,
    /// Whether failed native calls return `Err` instead of `Ok(false)`
    pub exception_on_error: bool,
    /// `MQCNO_*` flags
    pub connect_options: MqLong,
    /// Diagnostic level, 0 to 3
    pub trace_level: u8,
    /// Dead-letter queue used by `put_to_dead_letter_q`
    pub dead_letter_q_name: String,

    /// Read the client channel from `MQSERVER` at connect time
    pub use_system_connection_data: bool,
    /// Client channel name
    pub channel_name: Option<String>,
    /// Comma separated list of `host` or `host(port)`
    pub connection_name: Option<String>,
    /// Client transport
    pub transport_type: Option<TransportType>,
    /// Maximum message length of the channel
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
    /// Key repository location
    pub key_repository: Option<String>,
    /// Cryptographic hardware configuration
    pub crypto_hardware: Option<String>,
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

impl Default for Builder {
    fn default() -> Self {
        Self {
            q_mgr_name: String::new(),
            exception_on_error: true,
            connect_options: MQCNO_NONE,
            trace_level: 0,
            dead_letter_q_name: DEFAULT_DEAD_LETTER_Q_NAME.to_string(),
            use_system_connection_data: false,
            channel_name: None,
            connection_name: None,
            transport_type: None,
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
            key_repository: None,
            crypto_hardware: None,
            mode_name: None,
            tp_name: None,
            user_identifier: None,
            password: None,
            long_remote_user_id: None,
        }
    }
}

impl Builder {
    /// Creates a builder for the default queue manager over the local binding
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue manager name
    pub fn q_mgr_name(mut self, q_mgr_name: impl Into<String>) -> Self {
        self.q_mgr_name = q_mgr_name.into();
        self
    }

    /// Whether failed native calls return `Err`
    pub fn exception_on_error(mut self, exception_on_error: bool) -> Self {
        self.exception_on_error = exception_on_error;
        self
    }

    /// `MQCNO_*` flags
    pub fn connect_options(mut self, connect_options: MqLong) -> Self {
        self.connect_options = connect_options;
        self
    }

    /// Diagnostic level. Values above 3 are clamped.
    pub fn trace_level(mut self, trace_level: u8) -> Self {
        self.trace_level = trace_level.min(MAX_TRACE_LEVEL);
        self
    }

    /// Dead-letter queue used by `put_to_dead_letter_q`
    pub fn dead_letter_q_name(mut self, dead_letter_q_name: impl Into<String>) -> Self {
        self.dead_letter_q_name = dead_letter_q_name.into();
        self
    }

    /// Read the client channel from `MQSERVER`
    pub fn use_system_connection_data(mut self, value: bool) -> Self {
        self.use_system_connection_data = value;
        self
    }

    /// Client channel name
    pub fn channel_name(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = Some(channel_name.into());
        self
    }

    /// Client connection name, `host(port)`
    pub fn connection_name(mut self, connection_name: impl Into<String>) -> Self {
        self.connection_name = Some(connection_name.into());
        self
    }

    /// Client transport
    pub fn transport_type(mut self, transport_type: TransportType) -> Self {
        self.transport_type = Some(transport_type);
        self
    }

    /// Maximum message length of the channel
    pub fn max_msg_length(mut self, max_msg_length: MqLong) -> Self {
        self.max_msg_length = Some(max_msg_length);
        self
    }

    /// Security exit and its user data
    pub fn security_exit(mut self, name: impl Into<String>, user_data: impl Into<String>) -> Self {
        self.security_exit = Some(name.into());
        self.security_user_data = Some(user_data.into());
        self
    }

    /// Send exit and its user data
    pub fn send_exit(mut self, name: impl Into<String>, user_data: impl Into<String>) -> Self {
        self.send_exit = Some(name.into());
        self.send_user_data = Some(user_data.into());
        self
    }

    /// Receive exit and its user data
    pub fn receive_exit(mut self, name: impl Into<String>, user_data: impl Into<String>) -> Self {
        self.receive_exit = Some(name.into());
        self.receive_user_data = Some(user_data.into());
        self
    }

    /// Heartbeat interval in seconds
    pub fn heartbeat_interval(mut self, seconds: MqLong) -> Self {
        self.heartbeat_interval = Some(seconds);
        self
    }

    /// Keep-alive interval in seconds
    pub fn keep_alive_interval(mut self, seconds: MqLong) -> Self {
        self.keep_alive_interval = Some(seconds);
        self
    }

    /// Remote security identifier
    pub fn remote_security_id(mut self, id: impl Into<String>) -> Self {
        self.remote_security_id = Some(id.into());
        self
    }

    /// SSL cipher specification
    pub fn ssl_cipher_spec(mut self, cipher_spec: impl Into<String>) -> Self {
        self.ssl_cipher_spec = Some(cipher_spec.into());
        self
    }

    /// Distinguished name pattern of the peer certificate
    pub fn ssl_peer_name(mut self, peer_name: impl Into<String>) -> Self {
        self.ssl_peer_name = Some(peer_name.into());
        self
    }

    /// Key repository location
    pub fn key_repository(mut self, path: impl Into<String>) -> Self {
        self.key_repository = Some(path.into());
        self
    }

    /// Cryptographic hardware configuration
    pub fn crypto_hardware(mut self, config: impl Into<String>) -> Self {
        self.crypto_hardware = Some(config.into());
        self
    }

    /// LU 6.2 mode and transaction program names
    pub fn lu62(mut self, mode_name: impl Into<String>, tp_name: impl Into<String>) -> Self {
        self.mode_name = Some(mode_name.into());
        self.tp_name = Some(tp_name.into());
        self
    }

    /// User identifier and password
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user_identifier = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Long remote user identifier
    pub fn long_remote_user_id(mut self, id: impl Into<String>) -> Self {
        self.long_remote_user_id = Some(id.into());
        self
    }

    /// Whether any client channel field is set
    pub fn is_client(&self) -> bool {
        self.use_system_connection_data
            || self.connection_name.is_some()
            || self.channel_name.is_some()
            || self.transport_type.is_some()
    }

    /// Resolves the connect options handed to the native connect call.
    /// `MQSERVER` is read here when system connection data was requested.
    pub fn build_connect_options(&self) -> Result<ConnectOptions, Error> {
        let client = if self.use_system_connection_data {
            let value = std::env::var(MQSERVER)
                .map_err(|_| Error::Config(format!("{} is not set", MQSERVER)))?;
            let mut cd = parse_mqserver(&value)?;
            self.apply_channel_fields(&mut cd);
            Some(cd)
        } else if self.is_client() {
            let connection_name = self.connection_name.clone().ok_or_else(|| {
                Error::Config("connection_name is required for a client connection".into())
            })?;
            validate_connection_name(&connection_name)?;
            let mut cd = ChannelDefinition {
                channel_name: self
                    .channel_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string()),
                connection_name,
                transport_type: self.transport_type.unwrap_or_default(),
                ..Default::default()
            };
            self.apply_channel_fields(&mut cd);
            Some(cd)
        } else {
            None
        };

        let ssl = if self.key_repository.is_some() || self.crypto_hardware.is_some() {
            if client.is_none() {
                return Err(Error::Config(
                    "SSL settings require a client connection".into(),
                ));
            }
            Some(SslConfiguration {
                key_repository: self.key_repository.clone(),
                crypto_hardware: self.crypto_hardware.clone(),
            })
        } else {
            None
        };

        Ok(ConnectOptions {
            options: self.connect_options,
            client,
            ssl,
        })
    }

    fn apply_channel_fields(&self, cd: &mut ChannelDefinition) {
        cd.max_msg_length = self.max_msg_length;
        cd.security_exit = self.security_exit.clone();
        cd.send_exit = self.send_exit.clone();
        cd.receive_exit = self.receive_exit.clone();
        cd.security_user_data = self.security_user_data.clone();
        cd.send_user_data = self.send_user_data.clone();
        cd.receive_user_data = self.receive_user_data.clone();
        cd.heartbeat_interval = self.heartbeat_interval;
        cd.keep_alive_interval = self.keep_alive_interval;
        cd.remote_security_id = self.remote_security_id.clone();
        cd.ssl_cipher_spec = self.ssl_cipher_spec.clone();
        cd.ssl_peer_name = self.ssl_peer_name.clone();
        cd.mode_name = self.mode_name.clone();
        cd.tp_name = self.tp_name.clone();
        cd.user_identifier = self.user_identifier.clone();
        cd.password = self.password.clone();
        cd.long_remote_user_id = self.long_remote_user_id.clone();
    }

    /// Creates a disconnected [`QueueManager`] with this configuration
    pub fn build<M: Mqi>(self, mqi: M) -> QueueManager<M> {
        QueueManager::new(mqi, self)
    }

    /// Creates a [`QueueManager`] and connects it. A failed connect is always
    /// returned as `Err`, whatever `exception_on_error` says.
    pub fn connect<M: Mqi>(self, mqi: M) -> Result<QueueManager<M>, Error> {
        let mut queue_manager = self.build(mqi);
        queue_manager.connect_or_err()?;
        Ok(queue_manager)
    }

    /// Connects, runs `f` with the connection and releases the connection on
    /// every exit path.
    ///
    /// Any pending unit of work is backed out before disconnecting, so work
    /// is only kept when `f` commits it explicitly. An error from `f` is
    /// returned after the backout and disconnect.
    pub fn connect_with<M, F, T, E>(self, mqi: M, f: F) -> Result<T, E>
    where
        M: Mqi,
        F: FnOnce(&QueueManager<M>) -> Result<T, E>,
        E: From<Error>,
    {
        let mut queue_manager = self.connect(mqi)?;
        let result = f(&queue_manager);
        if result.is_err() {
            #[cfg(feature = "tracing")]
            tracing::warn!(q_mgr_name = %queue_manager.name(), "Backing out due to unhandled error");
            #[cfg(feature = "log")]
            log::warn!("{}: Backing out due to unhandled error", queue_manager.name());
        }
        let released = queue_manager.release();
        match result {
            Ok(value) => {
                released?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }
}

/// Parses the `CHANNEL/TRANSPORT/CONNECTION` form of `MQSERVER`
pub fn parse_mqserver(value: &str) -> Result<ChannelDefinition, Error> {
    let mut parts = value.splitn(3, '/');
    let (channel_name, transport, connection_name) = match (parts.next(), parts.next(), parts.next()) {
        (Some(channel), Some(transport), Some(connection)) => (channel, transport, connection),
        _ => {
            return Err(Error::Config(format!(
                "{} must have the form CHANNEL/TRANSPORT/CONNECTION, found {:?}",
                MQSERVER, value
            )))
        }
    };
    let channel_name = channel_name.trim();
    if channel_name.is_empty() {
        return Err(Error::Config(format!("{} has an empty channel name", MQSERVER)));
    }
    let transport_type: TransportType = transport.parse()?;
    let connection_name = connection_name.trim();
    validate_connection_name(connection_name)?;

    Ok(ChannelDefinition {
        channel_name: channel_name.to_string(),
        connection_name: connection_name.to_string(),
        transport_type,
        ..Default::default()
    })
}

/// Checks a comma separated list of `host` or `host(port)` entries
pub fn validate_connection_name(connection_name: &str) -> Result<(), Error> {
    let invalid = |entry: &str| {
        Error::Config(format!(
            "invalid connection name entry {:?}, expected host or host(port)",
            entry
        ))
    };

    if connection_name.trim().is_empty() {
        return Err(Error::Config("connection name is empty".into()));
    }
    for entry in connection_name.split(',') {
        let entry = entry.trim();
        let (host, port) = match entry.find('(') {
            Some(open) => {
                let port = entry[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| invalid(entry))?;
                (&entry[..open], Some(port))
            }
            None => (entry, None),
        };
        if host.is_empty() || host.contains(|c: char| c.is_whitespace() || c == ')') {
            return Err(invalid(entry));
        }
        if let Some(port) = port {
            match port.trim().parse::<u16>() {
                Ok(port) if port > 0 => {}
                _ => return Err(invalid(entry)),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmq_types::constants::MQCNO_FASTPATH_BINDING;

    #[test]
    fn local_binding_by_default() {
        let options = Builder::new()
            .q_mgr_name("QM1")
            .connect_options(MQCNO_FASTPATH_BINDING)
            .build_connect_options()
            .unwrap();
        assert!(!options.is_client());
        assert_eq!(options.options, MQCNO_FASTPATH_BINDING);
    }

    #[test]
    fn client_channel_defaults() {
        let options = Builder::new()
            .connection_name("mq1(1414),mq2(1415)")
            .heartbeat_interval(30)
            .ssl_cipher_spec("TLS_RSA_WITH_AES_128_CBC_SHA256")
            .key_repository("/var/mqm/ssl/key")
            .build_connect_options()
            .unwrap();
        let cd = options.client.unwrap();
        assert_eq!(cd.channel_name, DEFAULT_CHANNEL_NAME);
        assert_eq!(cd.transport_type, TransportType::Tcp);
        assert_eq!(cd.connection_name, "mq1(1414),mq2(1415)");
        assert_eq!(cd.heartbeat_interval, Some(30));
        assert_eq!(
            options.ssl.unwrap().key_repository.as_deref(),
            Some("/var/mqm/ssl/key")
        );
    }

    #[test]
    fn client_fields_without_connection_name() {
        let err = Builder::new()
            .channel_name("APP.SVRCONN")
            .build_connect_options()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn ssl_requires_client() {
        assert!(Builder::new()
            .key_repository("/var/mqm/ssl/key")
            .build_connect_options()
            .is_err());
    }

    #[test]
    fn connection_name_validation() {
        assert!(validate_connection_name("localhost").is_ok());
        assert!(validate_connection_name("localhost(1414)").is_ok());
        assert!(validate_connection_name("10.0.0.1(1414), 10.0.0.2(1414)").is_ok());
        assert!(validate_connection_name("").is_err());
        assert!(validate_connection_name("localhost(abc)").is_err());
        assert!(validate_connection_name("localhost(0)").is_err());
        assert!(validate_connection_name("localhost(1414").is_err());
        assert!(validate_connection_name("(1414)").is_err());
        assert!(validate_connection_name("mq1(1414),").is_err());
    }

    #[test]
    fn mqserver_parsing() {
        let cd = parse_mqserver("APP.SVRCONN/TCP/mqhost(1414)").unwrap();
        assert_eq!(cd.channel_name, "APP.SVRCONN");
        assert_eq!(cd.transport_type, TransportType::Tcp);
        assert_eq!(cd.connection_name, "mqhost(1414)");

        assert!(parse_mqserver("APP.SVRCONN/TCP").is_err());
        assert!(parse_mqserver("APP.SVRCONN/IPX/mqhost(1414)").is_err());
        assert!(parse_mqserver("/TCP/mqhost(1414)").is_err());
    }

    #[test]
    fn trace_level_is_clamped() {
        assert_eq!(Builder::new().trace_level(9).trace_level, 3);
    }

    #[test]
    fn deserialize_with_defaults() {
        let builder: Builder = serde_json::from_str(
            r#"{
                "q_mgr_name": "QM1",
                "connection_name": "localhost(1414)",
                "transport_type": "TCP",
                "trace_level": 2
            }"#,
        )
        .unwrap();
        assert_eq!(builder.q_mgr_name, "QM1");
        assert!(builder.exception_on_error);
        assert_eq!(builder.trace_level, 2);
        assert_eq!(builder.dead_letter_q_name, DEFAULT_DEAD_LETTER_Q_NAME);
        assert!(builder.is_client());
    }
}
