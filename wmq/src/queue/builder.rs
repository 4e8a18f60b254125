use serde::Deserialize;
use wmq_types::{
    constants::{
        MqLong, MQCO_NONE, MQOO_ALTERNATE_USER_AUTHORITY, MQOO_BROWSE, MQOO_FAIL_IF_QUIESCING,
        MQOO_INPUT_AS_Q_DEF, MQOO_INPUT_EXCLUSIVE, MQOO_INPUT_SHARED, MQOO_OUTPUT,
    },
    options::ObjectDescriptor,
    Destination,
};

use crate::error::Error;

/// How a queue is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Put messages, `MQOO_OUTPUT`
    Output,
    /// Get messages with the queue's default sharing, `MQOO_INPUT_AS_Q_DEF`
    Input,
    /// Get messages with shared access, `MQOO_INPUT_SHARED`
    InputShared,
    /// Get messages with exclusive access, `MQOO_INPUT_EXCLUSIVE`
    InputExclusive,
    /// Browse messages without removing them, `MQOO_BROWSE`
    Browse,
}

impl Mode {
    /// Open options of the mode
    pub fn open_options(&self) -> MqLong {
        match self {
            Mode::Output => MQOO_OUTPUT,
            Mode::Input => MQOO_INPUT_AS_Q_DEF,
            Mode::InputShared => MQOO_INPUT_SHARED,
            Mode::InputExclusive => MQOO_INPUT_EXCLUSIVE,
            Mode::Browse => MQOO_BROWSE,
        }
    }
}

/// Open configuration of a [`Queue`](super::Queue)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Builder {
    /// Queue name, or the name of a model queue
    pub q_name: String,
    /// Remote queue manager, for put-only routing
    pub q_mgr_name: Option<String>,
    /// Open mode
    pub mode: Option<Mode>,
    /// Additional `MQOO_*` flags. Required when no mode is given.
    pub open_options: Option<MqLong>,
    /// `MQCO_*` flags used on close
    pub close_options: MqLong,
    /// Dynamic queue name or template ending in `*`, used with a model queue
    pub dynamic_q_name: Option<String>,
    /// When `false`, a dynamic queue whose name already exists is reopened
    /// instead of failing the open
    pub fail_if_exists: bool,
    /// Fail the open when the queue manager is quiescing. When `true` the
    /// flag is forced on whatever `open_options` says.
    pub fail_if_quiescing: bool,
    /// Alternate user identifier. Alternate user authority is requested
    /// automatically.
    pub alternate_user_id: Option<String>,
    /// Alternate security identifier
    pub alternate_security_id: Option<Vec<u8>>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            q_name: String::new(),
            q_mgr_name: None,
            mode: None,
            open_options: None,
            close_options: MQCO_NONE,
            dynamic_q_name: None,
            fail_if_exists: true,
            fail_if_quiescing: true,
            alternate_user_id: None,
            alternate_security_id: None,
        }
    }
}

impl Builder {
    /// Opens `destination`
    pub fn new(destination: impl Into<Destination>) -> Self {
        let destination = destination.into();
        Self {
            q_name: destination.q_name,
            q_mgr_name: destination.q_mgr_name,
            ..Default::default()
        }
    }

    /// Open mode
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Additional `MQOO_*` flags
    pub fn open_options(mut self, open_options: MqLong) -> Self {
        self.open_options = Some(open_options);
        self
    }

    /// `MQCO_*` flags used on close
    pub fn close_options(mut self, close_options: MqLong) -> Self {
        self.close_options = close_options;
        self
    }

    /// Dynamic queue name or template
    pub fn dynamic_q_name(mut self, dynamic_q_name: impl Into<String>) -> Self {
        self.dynamic_q_name = Some(dynamic_q_name.into());
        self
    }

    /// Whether an existing dynamic queue fails the open
    pub fn fail_if_exists(mut self, value: bool) -> Self {
        self.fail_if_exists = value;
        self
    }

    /// Whether the open fails when the queue manager is quiescing
    pub fn fail_if_quiescing(mut self, value: bool) -> Self {
        self.fail_if_quiescing = value;
        self
    }

    /// Alternate user identifier
    pub fn alternate_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.alternate_user_id = Some(user_id.into());
        self
    }

    /// Alternate security identifier
    pub fn alternate_security_id(mut self, security_id: impl Into<Vec<u8>>) -> Self {
        self.alternate_security_id = Some(security_id.into());
        self
    }

    /// Target of the open
    pub fn destination(&self) -> Destination {
        Destination {
            q_name: self.q_name.clone(),
            q_mgr_name: self.q_mgr_name.clone(),
        }
    }

    /// Resolves the open options from the mode and the explicit flags
    pub fn resolve_open_options(&self) -> Result<MqLong, Error> {
        let mut options = match (self.mode, self.open_options) {
            (None, None) => {
                return Err(Error::Config(
                    "either mode or open_options must be supplied".into(),
                ))
            }
            (mode, explicit) => {
                mode.map(|mode| mode.open_options()).unwrap_or(0) | explicit.unwrap_or(0)
            }
        };
        if self.fail_if_quiescing {
            options |= MQOO_FAIL_IF_QUIESCING;
        }
        if self.alternate_user_id.is_some() {
            options |= MQOO_ALTERNATE_USER_AUTHORITY;
        }
        Ok(options)
    }

    pub(crate) fn object_descriptor(&self) -> ObjectDescriptor {
        let mut od = ObjectDescriptor {
            object_name: self.q_name.clone(),
            object_q_mgr_name: self.q_mgr_name.clone().unwrap_or_default(),
            alternate_user_id: self.alternate_user_id.clone().unwrap_or_default(),
            alternate_security_id: self.alternate_security_id.clone().unwrap_or_default(),
            ..Default::default()
        };
        if let Some(dynamic_q_name) = &self.dynamic_q_name {
            od.dynamic_q_name = dynamic_q_name.clone();
        }
        od
    }
}
