use serde::{Deserialize, Serialize};

/// Target of an open or a single put
///
/// `q_mgr_name` names a remote queue manager for put-only routing without a
/// local remote-queue definition. When absent the connected queue manager
/// resolves the name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    /// Queue name
    pub q_name: String,

    /// Queue manager owning the queue
    #[serde(default)]
    pub q_mgr_name: Option<String>,
}

impl Destination {
    /// Queue on the connected queue manager
    pub fn new(q_name: impl Into<String>) -> Self {
        Self {
            q_name: q_name.into(),
            q_mgr_name: None,
        }
    }

    /// Queue on the named queue manager. An empty name is treated as absent.
    pub fn remote(q_name: impl Into<String>, q_mgr_name: impl Into<String>) -> Self {
        let q_mgr_name = q_mgr_name.into();
        Self {
            q_name: q_name.into(),
            q_mgr_name: if q_mgr_name.is_empty() {
                None
            } else {
                Some(q_mgr_name)
            },
        }
    }

    /// Queue manager name, or an empty string when absent
    pub fn q_mgr_name(&self) -> &str {
        self.q_mgr_name.as_deref().unwrap_or("")
    }
}

impl From<&str> for Destination {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Destination {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.q_mgr_name {
            Some(q_mgr_name) => write!(f, "{}@{}", self.q_name, q_mgr_name),
            None => f.write_str(&self.q_name),
        }
    }
}
