//! Queue definitions and message storage

use std::collections::VecDeque;

use wmq_types::{
    constants::{
        MqLong, MQCI_NONE, MQMI_NONE, MQMO_MATCH_CORREL_ID, MQMO_MATCH_MSG_ID,
        MQPER_NOT_PERSISTENT, MQQDT_PERMANENT_DYNAMIC, MQQDT_PREDEFINED,
        MQQDT_TEMPORARY_DYNAMIC, MQQT_LOCAL, MQQT_MODEL,
    },
    options::GetOptions,
    MessageDescriptor,
};

/// Default maximum depth of a new queue
pub const DEFAULT_MAX_DEPTH: MqLong = 5000;

/// Default maximum message length of a new queue
pub const DEFAULT_MAX_MSG_LENGTH: MqLong = 4 * 1024 * 1024;

/// Type of a queue definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueType {
    /// Holds messages
    Local,
    /// Template for dynamic queues
    Model,
}

impl QueueType {
    /// The raw `MQQT_*` value
    pub fn as_raw(&self) -> MqLong {
        match self {
            QueueType::Local => MQQT_LOCAL,
            QueueType::Model => MQQT_MODEL,
        }
    }

    pub(crate) fn mqsc_name(&self) -> &'static str {
        match self {
            QueueType::Local => "QLOCAL",
            QueueType::Model => "QMODEL",
        }
    }
}

/// How a queue came to exist. On a model queue this is the type of the
/// dynamic queues it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionType {
    /// Defined administratively
    Predefined,
    /// Created from a model, deleted only on request
    PermanentDynamic,
    /// Created from a model, deleted when the creating handle closes
    TemporaryDynamic,
}

impl DefinitionType {
    /// The raw `MQQDT_*` value
    pub fn as_raw(&self) -> MqLong {
        match self {
            DefinitionType::Predefined => MQQDT_PREDEFINED,
            DefinitionType::PermanentDynamic => MQQDT_PERMANENT_DYNAMIC,
            DefinitionType::TemporaryDynamic => MQQDT_TEMPORARY_DYNAMIC,
        }
    }

    pub(crate) fn mqsc_name(&self) -> &'static str {
        match self {
            DefinitionType::Predefined => "PREDEFINED",
            DefinitionType::PermanentDynamic => "PERMDYN",
            DefinitionType::TemporaryDynamic => "TEMPDYN",
        }
    }
}

/// Attributes of a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDefinition {
    /// Queue name
    pub name: String,
    /// Local or model
    pub q_type: QueueType,
    /// Definition type
    pub definition_type: DefinitionType,
    /// Free text description
    pub description: String,
    /// Maximum number of messages, committed or not
    pub max_depth: MqLong,
    /// Maximum length of the message data
    pub max_msg_length: MqLong,
    /// Whether more than one handle may be open for input
    pub shareable: bool,
    /// Whether `MQOO_INPUT_AS_Q_DEF` opens for shared input
    pub default_input_shared: bool,
    /// Reject gets
    pub inhibit_get: bool,
    /// Reject puts
    pub inhibit_put: bool,
    /// Persistence of messages put with `MQPER_PERSISTENCE_AS_Q_DEF`
    pub default_persistence: MqLong,
    /// Priority of messages put with `MQPRI_PRIORITY_AS_Q_DEF`
    pub default_priority: MqLong,
}

impl QueueDefinition {
    /// A predefined local queue with default attributes
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            q_type: QueueType::Local,
            definition_type: DefinitionType::Predefined,
            description: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_msg_length: DEFAULT_MAX_MSG_LENGTH,
            shareable: true,
            default_input_shared: true,
            inhibit_get: false,
            inhibit_put: false,
            default_persistence: MQPER_NOT_PERSISTENT,
            default_priority: 0,
        }
    }

    /// A model queue creating dynamic queues of `definition_type`
    pub fn model(name: impl Into<String>, definition_type: DefinitionType) -> Self {
        Self {
            q_type: QueueType::Model,
            definition_type,
            ..Self::local(name)
        }
    }

    /// Maximum depth
    pub fn max_depth(mut self, max_depth: MqLong) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Maximum message length
    pub fn max_msg_length(mut self, max_msg_length: MqLong) -> Self {
        self.max_msg_length = max_msg_length;
        self
    }

    /// Description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether more than one handle may be open for input
    pub fn shareable(mut self, shareable: bool) -> Self {
        self.shareable = shareable;
        self
    }

    /// Reject gets
    pub fn inhibit_get(mut self, inhibit: bool) -> Self {
        self.inhibit_get = inhibit;
        self
    }

    /// Reject puts
    pub fn inhibit_put(mut self, inhibit: bool) -> Self {
        self.inhibit_put = inhibit;
        self
    }

    /// The definition of a dynamic queue named `name` created from this model
    pub(crate) fn instantiate(&self, name: String) -> Self {
        Self {
            name,
            q_type: QueueType::Local,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    Committed,
    /// Put under syncpoint by the connection with this key
    Put(usize),
    /// Got under syncpoint by the connection with this key
    Got(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct StoredMessage {
    pub sequence: u64,
    pub md: MessageDescriptor,
    pub data: Vec<u8>,
    pub visibility: Visibility,
}

impl StoredMessage {
    fn matches(&self, gmo: &GetOptions) -> bool {
        if gmo.match_options & MQMO_MATCH_MSG_ID != 0
            && gmo.msg_id != MQMI_NONE
            && gmo.msg_id != self.md.msg_id
        {
            return false;
        }
        if gmo.match_options & MQMO_MATCH_CORREL_ID != 0
            && gmo.correl_id != MQCI_NONE
            && gmo.correl_id != self.md.correl_id
        {
            return false;
        }
        true
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Committed
    }
}

/// A queue with its messages and open counts
#[derive(Debug)]
pub(crate) struct LocalQueue {
    pub definition: QueueDefinition,
    /// Ordered by sequence number
    pub messages: VecDeque<StoredMessage>,
    pub input_count: usize,
    pub output_count: usize,
    pub open_count: usize,
    pub exclusive: bool,
    /// Object key of the handle that created a temporary dynamic queue
    pub creator: Option<usize>,
}

impl LocalQueue {
    pub fn new(definition: QueueDefinition) -> Self {
        Self {
            definition,
            messages: VecDeque::new(),
            input_count: 0,
            output_count: 0,
            open_count: 0,
            exclusive: false,
            creator: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.messages.len()
    }

    pub fn is_full(&self) -> bool {
        self.depth() >= usize::try_from(self.definition.max_depth).unwrap_or(0)
    }

    pub fn has_uncommitted(&self) -> bool {
        self.messages.iter().any(|message| !message.is_visible())
    }

    /// Index of the first visible message after `after` matching `gmo`
    pub fn find(&self, after: Option<u64>, gmo: &GetOptions) -> Option<usize> {
        self.messages.iter().position(|message| {
            after.map_or(true, |after| message.sequence > after)
                && message.is_visible()
                && message.matches(gmo)
        })
    }

    pub fn position(&self, sequence: u64) -> Option<usize> {
        self.messages
            .binary_search_by_key(&sequence, |message| message.sequence)
            .ok()
    }

    pub fn get_mut(&mut self, sequence: u64) -> Option<&mut StoredMessage> {
        let index = self.position(sequence)?;
        self.messages.get_mut(index)
    }

    pub fn remove(&mut self, sequence: u64) -> Option<StoredMessage> {
        let index = self.position(sequence)?;
        self.messages.remove(index)
    }

    /// Discards every message, failing when some are part of a unit of work
    pub fn clear(&mut self) -> bool {
        if self.has_uncommitted() {
            return false;
        }
        self.messages.clear();
        true
    }
}

/// Whether `name` matches a name that may end in `*`
pub(crate) fn matches_generic(generic: &str, name: &str) -> bool {
    match generic.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => generic == name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(sequence: u64, msg_id: u8, visibility: Visibility) -> StoredMessage {
        let md = MessageDescriptor {
            msg_id: [msg_id; 24],
            ..Default::default()
        };
        StoredMessage {
            sequence,
            md,
            data: Vec::new(),
            visibility,
        }
    }

    fn queue() -> LocalQueue {
        let mut queue = LocalQueue::new(QueueDefinition::local("TEST.Q").max_depth(3));
        queue.messages.push_back(stored(1, 1, Visibility::Committed));
        queue.messages.push_back(stored(2, 2, Visibility::Put(0)));
        queue.messages.push_back(stored(3, 3, Visibility::Committed));
        queue
    }

    #[test]
    fn find_skips_uncommitted_and_honours_cursor() {
        let queue = queue();
        let any = GetOptions::default();
        assert_eq!(queue.find(None, &any), Some(0));
        assert_eq!(queue.find(Some(1), &any), Some(2));
        assert_eq!(queue.find(Some(3), &any), None);
    }

    #[test]
    fn find_matches_ids() {
        let queue = queue();
        let gmo = GetOptions {
            msg_id: [3; 24],
            ..Default::default()
        };
        assert_eq!(queue.find(None, &gmo), Some(2));

        let gmo = GetOptions {
            msg_id: [2; 24],
            ..Default::default()
        };
        assert_eq!(queue.find(None, &gmo), None);
    }

    #[test]
    fn depth_limits_and_clear() {
        let mut queue = queue();
        assert!(queue.is_full());
        assert!(!queue.clear());
        queue.remove(2);
        assert!(!queue.is_full());
        assert!(queue.clear());
        assert_eq!(queue.depth(), 0);
    }

    #[test]
    fn generic_names() {
        assert!(matches_generic("*", "SYSTEM.DEAD.LETTER.QUEUE"));
        assert!(matches_generic("APP.*", "APP.IN"));
        assert!(!matches_generic("APP.*", "SYSTEM.IN"));
        assert!(matches_generic("APP.IN", "APP.IN"));
        assert!(!matches_generic("APP.IN", "APP.INPUT"));
    }
}
