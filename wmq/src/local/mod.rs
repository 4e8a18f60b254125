//! In-process queue manager
//!
//! [`LocalQueueManager`] implements [`Mqi`] in memory with the semantics of a
//! real queue manager that matter to the binding: local and model queues,
//! shared and exclusive input, browse cursors, syncpoint units of work,
//! waiting gets, message and correlation identifier matching, truncation,
//! routing to linked queue managers and a small administrative command set.
//!
//! Handles are cheap to clone and share one queue manager. Every connection
//! made through the [`Mqi`] implementation is independent, so a test can
//! drive a requester and a responder against the same instance.
//!
//! ```rust
//! use wmq::local::{LocalQueueManager, QueueDefinition};
//!
//! let qmgr = LocalQueueManager::new("QM1");
//! qmgr.define(QueueDefinition::local("APP.IN").max_depth(10)).unwrap();
//! assert_eq!(qmgr.depth("APP.IN"), Some(0));
//! ```

use std::{
    collections::BTreeMap,
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};
use slab::Slab;
use wmq_types::{
    constants::{
        MqLong, DEFAULT_DEAD_LETTER_Q_NAME, MQCO_DELETE, MQCO_DELETE_PURGE, MQET_MQSC, MQGMO_ACCEPT_TRUNCATED_MSG,
        MQGMO_BROWSE_ANY, MQGMO_BROWSE_FIRST, MQGMO_BROWSE_MSG_UNDER_CURSOR, MQGMO_BROWSE_NEXT,
        MQGMO_FAIL_IF_QUIESCING, MQGMO_MSG_UNDER_CURSOR, MQGMO_SYNCPOINT, MQGMO_WAIT, MQMI_NONE,
        MQMT_REQUEST, MQOO_BROWSE, MQOO_FAIL_IF_QUIESCING, MQOO_INPUT_ANY, MQOO_INPUT_AS_Q_DEF,
        MQOO_INPUT_EXCLUSIVE, MQOO_INPUT_SHARED, MQOO_INQUIRE, MQOO_OUTPUT, MQOO_SET,
        MQPER_PERSISTENCE_AS_Q_DEF, MQPMO_FAIL_IF_QUIESCING, MQPMO_NEW_CORREL_ID, MQPMO_NEW_MSG_ID,
        MQPMO_SYNCPOINT, MQPRI_PRIORITY_AS_Q_DEF, MQQA_GET_ALLOWED, MQQA_GET_INHIBITED,
        MQQA_NOT_SHAREABLE, MQQA_PUT_ALLOWED, MQQA_PUT_INHIBITED, MQQA_SHAREABLE, MQQT_ALL,
        MQWI_UNLIMITED, MQ_Q_NAME_LENGTH,
    },
    options::{AttributeValue, ConnectOptions, GetOptions, ObjectDescriptor, PutOptions, Selector},
    MessageDescriptor, MessageId, ReasonCode,
};

use crate::{
    command::{Command, ParameterValue, Parameters, ESCAPE_TEXT, Q_NAMES},
    mqi::{Hconn, Hobj, Mqi, Status},
};

mod mqsc;
mod queue;

pub use queue::{DefinitionType, QueueDefinition, QueueType, DEFAULT_MAX_DEPTH, DEFAULT_MAX_MSG_LENGTH};
use queue::{matches_generic, LocalQueue, StoredMessage, Visibility};

/// Name of the predefined default local queue
pub const DEFAULT_LOCAL_Q_NAME: &str = "SYSTEM.DEFAULT.LOCAL.QUEUE";

/// Name of the predefined model queue creating temporary dynamic queues
pub const DEFAULT_MODEL_Q_NAME: &str = "SYSTEM.DEFAULT.MODEL.QUEUE";

type Outcome<T> = Result<T, Status>;

/// An in-process queue manager
#[derive(Debug, Clone)]
pub struct LocalQueueManager {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    state: Mutex<State>,
    changed: Condvar,
}

#[derive(Debug, Default)]
struct State {
    connections: Slab<Connection>,
    objects: Slab<Object>,
    queues: BTreeMap<String, LocalQueue>,
    links: BTreeMap<String, Weak<Inner>>,
    quiescing: bool,
    msg_counter: u64,
    sequence: u64,
    dynamic_counter: u64,
}

#[derive(Debug, Default)]
struct Connection {
    uow: Vec<Pending>,
    global_uow: bool,
    broken: bool,
}

#[derive(Debug)]
enum Pending {
    Put { q_name: String, sequence: u64 },
    Get { q_name: String, sequence: u64 },
    Remote(Delivery),
}

/// A message bound for a linked queue manager
#[derive(Debug)]
struct Delivery {
    target: Weak<Inner>,
    q_name: String,
    md: MessageDescriptor,
    data: Vec<u8>,
}

#[derive(Debug)]
struct Object {
    connection: usize,
    q_name: String,
    options: MqLong,
    exclusive: bool,
    cursor: Option<u64>,
    remote: Option<Weak<Inner>>,
}

fn key_of(raw: MqLong) -> Option<usize> {
    usize::try_from(raw).ok()?.checked_sub(1)
}

fn raw_of(key: usize) -> MqLong {
    MqLong::try_from(key + 1).unwrap_or(MqLong::MAX)
}

fn outcome(result: Outcome<Status>) -> Status {
    result.unwrap_or_else(|status| status)
}

impl LocalQueueManager {
    /// Creates a queue manager with the dead-letter queue, the default local
    /// queue and the default model queue defined
    pub fn new(name: impl Into<String>) -> Self {
        let mut state = State::default();
        for definition in [
            QueueDefinition::local(DEFAULT_DEAD_LETTER_Q_NAME),
            QueueDefinition::local(DEFAULT_LOCAL_Q_NAME),
            QueueDefinition::model(DEFAULT_MODEL_Q_NAME, DefinitionType::TemporaryDynamic),
        ] {
            state
                .queues
                .insert(definition.name.clone(), LocalQueue::new(definition));
        }
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                state: Mutex::new(state),
                changed: Condvar::new(),
            }),
        }
    }

    /// Queue manager name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Defines a queue. Fails with `MQRC_OBJECT_ALREADY_EXISTS` when the name
    /// is taken.
    pub fn define(&self, definition: QueueDefinition) -> Result<(), ReasonCode> {
        self.inner.state.lock().define(definition, false)
    }

    /// Deletes a queue. Without `purge` the queue must be empty.
    pub fn delete(&self, q_name: &str, purge: bool) -> Result<(), ReasonCode> {
        self.inner.state.lock().delete(q_name, purge)
    }

    /// Number of messages on a queue, committed or not
    pub fn depth(&self, q_name: &str) -> Option<usize> {
        self.inner.state.lock().queues.get(q_name).map(LocalQueue::depth)
    }

    /// Names of the defined queues
    pub fn queue_names(&self) -> Vec<String> {
        self.inner.state.lock().queues.keys().cloned().collect()
    }

    /// Number of open connections
    pub fn connection_count(&self) -> usize {
        self.inner.state.lock().connections.len()
    }

    /// Makes each queue manager a routing destination of the other
    pub fn link(&self, other: &LocalQueueManager) {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return;
        }
        self.inner
            .state
            .lock()
            .links
            .insert(other.inner.name.clone(), Arc::downgrade(&other.inner));
        other
            .inner
            .state
            .lock()
            .links
            .insert(self.inner.name.clone(), Arc::downgrade(&self.inner));
    }

    /// Starts quiescing. New connections are refused and calls that ask to
    /// fail while quiescing fail with `MQRC_Q_MGR_QUIESCING`.
    pub fn quiesce(&self) {
        self.inner.state.lock().quiescing = true;
        self.inner.changed.notify_all();
    }

    /// Breaks every open connection. Pending units of work are backed out and
    /// later calls on the connections fail with `MQRC_CONNECTION_BROKEN`.
    pub fn break_connections(&self) {
        let mut state = self.inner.state.lock();
        let keys: Vec<usize> = state.connections.iter().map(|(key, _)| key).collect();
        for key in keys {
            state.backout(key);
            if let Some(connection) = state.connections.get_mut(key) {
                connection.broken = true;
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(q_mgr_name = %self.inner.name, "Connections broken");
        #[cfg(feature = "log")]
        log::debug!("{}: Connections broken", self.inner.name);
        drop(state);
        self.inner.changed.notify_all();
    }

    fn resolve_remote(&self, state: &State, q_mgr_name: &str) -> Outcome<Option<Weak<Inner>>> {
        let q_mgr_name = q_mgr_name.trim();
        if q_mgr_name.is_empty() || q_mgr_name == self.inner.name {
            return Ok(None);
        }
        match state.links.get(q_mgr_name) {
            Some(target) if target.strong_count() > 0 => Ok(Some(target.clone())),
            _ => Err(Status::failed(ReasonCode::UNKNOWN_REMOTE_Q_MGR)),
        }
    }

    fn deliver_all(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            if let Err(_status) = deliver(delivery) {
                #[cfg(feature = "tracing")]
                tracing::warn!(q_mgr_name = %self.inner.name, reason = %_status.reason, "Remote delivery failed at commit");
                #[cfg(feature = "log")]
                log::warn!("{}: Remote delivery failed at commit: {}", self.inner.name, _status.reason);
            }
        }
    }

    fn open_inner(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        options: MqLong,
        hobj: &mut Hobj,
    ) -> Outcome<Status> {
        let mut state = self.inner.state.lock();
        let connection = state.connection(hconn)?;
        state.check_quiescing(options & MQOO_FAIL_IF_QUIESCING != 0)?;

        let access = MQOO_INPUT_ANY | MQOO_BROWSE | MQOO_OUTPUT | MQOO_INQUIRE | MQOO_SET;
        if options & access == 0 || (options & MQOO_INPUT_ANY).count_ones() > 1 {
            return Err(Status::failed(ReasonCode::OPTIONS_ERROR));
        }

        if let Some(target) = self.resolve_remote(&state, &od.object_q_mgr_name)? {
            if options & (MQOO_INPUT_ANY | MQOO_BROWSE | MQOO_INQUIRE | MQOO_SET) != 0 {
                return Err(Status::failed(ReasonCode::OPTION_NOT_VALID_FOR_TYPE));
            }
            od.resolved_q_name = od.object_name.clone();
            od.resolved_q_mgr_name = od.object_q_mgr_name.trim().to_string();
            let key = state.objects.insert(Object {
                connection,
                q_name: od.object_name.clone(),
                options,
                exclusive: false,
                cursor: None,
                remote: Some(target),
            });
            *hobj = Hobj(raw_of(key));
            return Ok(Status::OK);
        }

        let definition = match state.queues.get(&od.object_name) {
            Some(queue) => queue.definition.clone(),
            None => return Err(Status::failed(ReasonCode::UNKNOWN_OBJECT_NAME)),
        };

        let (q_name, created) = match definition.q_type {
            QueueType::Local => (definition.name.clone(), None),
            QueueType::Model => {
                let q_name = state.dynamic_name(&od.dynamic_q_name)?;
                if state.queues.contains_key(&q_name) {
                    return Err(Status::failed(ReasonCode::OBJECT_ALREADY_EXISTS));
                }
                let created = definition.instantiate(q_name.clone());
                (q_name, Some(created))
            }
        };
        let attributes = created.as_ref().unwrap_or(&definition);

        let input = options & MQOO_INPUT_ANY != 0;
        let exclusive = input
            && (options & MQOO_INPUT_EXCLUSIVE != 0
                || !attributes.shareable
                || (options & MQOO_INPUT_AS_Q_DEF != 0 && !attributes.default_input_shared));
        if let Some(queue) = state.queues.get(&q_name) {
            if input && (queue.exclusive || (exclusive && queue.input_count > 0)) {
                return Err(Status::failed(ReasonCode::OBJECT_IN_USE));
            }
        }

        let temporary = created
            .as_ref()
            .map_or(false, |created| created.definition_type == DefinitionType::TemporaryDynamic);
        let key = state.objects.insert(Object {
            connection,
            q_name: q_name.clone(),
            options,
            exclusive,
            cursor: None,
            remote: None,
        });
        if let Some(created) = created {
            #[cfg(feature = "tracing")]
            tracing::debug!(q_mgr_name = %self.inner.name, q_name = %q_name, "Dynamic queue created");
            #[cfg(feature = "log")]
            log::debug!("{}: Dynamic queue {} created", self.inner.name, q_name);
            let mut queue = LocalQueue::new(created);
            if temporary {
                queue.creator = Some(key);
            }
            state.queues.insert(q_name.clone(), queue);
        }
        if let Some(queue) = state.queues.get_mut(&q_name) {
            queue.open_count += 1;
            if input {
                queue.input_count += 1;
                queue.exclusive |= exclusive;
            }
            if options & MQOO_OUTPUT != 0 {
                queue.output_count += 1;
            }
        }

        od.object_name = q_name.clone();
        od.resolved_q_name = q_name;
        od.resolved_q_mgr_name = self.inner.name.clone();
        *hobj = Hobj(raw_of(key));
        Ok(Status::OK)
    }

    fn close_inner(&self, hconn: Hconn, hobj: &mut Hobj, options: MqLong) -> Outcome<Status> {
        let mut state = self.inner.state.lock();
        let connection = state.connection(hconn)?;
        let key = state.object_key(connection, *hobj)?;
        state.close_object(key, options)?;
        *hobj = Hobj::UNUSABLE;
        Ok(Status::OK)
    }

    fn put_inner(
        &self,
        hconn: Hconn,
        target: PutTarget<'_>,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Outcome<Status> {
        let mut state = self.inner.state.lock();
        let connection = state.connection(hconn)?;
        state.check_quiescing(pmo.options & MQPMO_FAIL_IF_QUIESCING != 0)?;

        let (q_name, remote) = match target {
            PutTarget::Object(hobj) => {
                let key = state.object_key(connection, hobj)?;
                let object = &state.objects[key];
                if object.options & MQOO_OUTPUT == 0 {
                    return Err(Status::failed(ReasonCode::NOT_OPEN_FOR_OUTPUT));
                }
                if object.remote.is_none() && !state.queues.contains_key(&object.q_name) {
                    return Err(Status::failed(ReasonCode::Q_DELETED));
                }
                (object.q_name.clone(), object.remote.clone())
            }
            PutTarget::Descriptor(od) => {
                let remote = self.resolve_remote(&state, &od.object_q_mgr_name)?;
                if remote.is_none() {
                    match state.queues.get(&od.object_name) {
                        None => return Err(Status::failed(ReasonCode::UNKNOWN_OBJECT_NAME)),
                        Some(queue) if queue.definition.q_type != QueueType::Local => {
                            return Err(Status::failed(ReasonCode::Q_TYPE_ERROR))
                        }
                        Some(_) => {}
                    }
                }
                od.resolved_q_name = od.object_name.clone();
                od.resolved_q_mgr_name = match &remote {
                    Some(_) => od.object_q_mgr_name.trim().to_string(),
                    None => self.inner.name.clone(),
                };
                (od.object_name.clone(), remote)
            }
        };

        state.stamp(&self.inner.name, md, pmo.options)?;
        let syncpoint = pmo.options & MQPMO_SYNCPOINT != 0;
        pmo.resolved_q_name = q_name.clone();

        match remote {
            None => {
                pmo.resolved_q_mgr_name = self.inner.name.clone();
                let pending = syncpoint.then_some(connection);
                let sequence = state.enqueue(&q_name, md, buffer, pending)?;
                if let Some(connection) = state.connections.get_mut(connection) {
                    if syncpoint {
                        connection.uow.push(Pending::Put { q_name, sequence });
                    }
                }
                drop(state);
                if !syncpoint {
                    self.inner.changed.notify_all();
                }
                Ok(Status::OK)
            }
            Some(target) => {
                pmo.resolved_q_mgr_name = target
                    .upgrade()
                    .map(|inner| inner.name.clone())
                    .unwrap_or_default();
                let delivery = Delivery {
                    target,
                    q_name,
                    md: md.clone(),
                    data: buffer.to_vec(),
                };
                if syncpoint {
                    if let Some(connection) = state.connections.get_mut(connection) {
                        connection.uow.push(Pending::Remote(delivery));
                    }
                    return Ok(Status::OK);
                }
                drop(state);
                deliver(delivery)?;
                Ok(Status::OK)
            }
        }
    }

    fn get_inner(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        gmo: &mut GetOptions,
        buffer: &mut [u8],
        data_length: &mut usize,
    ) -> Outcome<Status> {
        let deadline = if gmo.options & MQGMO_WAIT != 0 {
            match gmo.wait_interval {
                MQWI_UNLIMITED => None,
                interval if interval >= 0 => Some(
                    Instant::now() + Duration::from_millis(u64::try_from(interval).unwrap_or(0)),
                ),
                _ => return Err(Status::failed(ReasonCode::WAIT_INTERVAL_ERROR)),
            }
        } else {
            Some(Instant::now())
        };

        let mut state = self.inner.state.lock();
        loop {
            let connection = state.connection(hconn)?;
            state.check_quiescing(gmo.options & MQGMO_FAIL_IF_QUIESCING != 0)?;
            let key = state.object_key(connection, hobj)?;
            if let Some(status) = state.take(connection, key, md, gmo, buffer, data_length)? {
                return Ok(status);
            }
            match deadline {
                None => self.inner.changed.wait(&mut state),
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Err(Status::failed(ReasonCode::NO_MSG_AVAILABLE));
                    }
                    let _ = self.inner.changed.wait_until(&mut state, deadline);
                }
            }
        }
    }

    fn inq_inner(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        selectors: &[Selector],
        values: &mut Vec<AttributeValue>,
    ) -> Outcome<Status> {
        let state = self.inner.state.lock();
        let connection = state.connection(hconn)?;
        let key = state.object_key(connection, hobj)?;
        let object = &state.objects[key];
        if object.options & MQOO_INQUIRE == 0 {
            return Err(Status::failed(ReasonCode::NOT_OPEN_FOR_INQUIRE));
        }
        let queue = state
            .queues
            .get(&object.q_name)
            .ok_or_else(|| Status::failed(ReasonCode::Q_DELETED))?;
        values.clear();
        values.extend(selectors.iter().map(|selector| attribute(queue, *selector)));
        Ok(Status::OK)
    }

    fn execute_inner(
        &self,
        hconn: Hconn,
        command: &Command,
        responses: &mut Vec<Parameters>,
    ) -> Outcome<Status> {
        let mut state = self.inner.state.lock();
        state.connection(hconn)?;
        match command {
            Command::PingQueueManager => {}
            Command::InquireQueueNames { q_name, q_type } => {
                let names = state.queue_names(q_name, q_type.unwrap_or(MQQT_ALL));
                let mut record = Parameters::new();
                record.insert(Q_NAMES.into(), ParameterValue::StringList(names));
                responses.push(record);
            }
            Command::ClearQueue { q_name } => {
                state.clear(q_name).map_err(Status::failed)?;
            }
            Command::Escape {
                escape_type,
                escape_text,
            } => {
                if *escape_type != MQET_MQSC {
                    return Err(Status::failed(ReasonCode::PCF_ERROR));
                }
                for text in mqsc::run(&mut state, escape_text) {
                    let mut record = Parameters::new();
                    record.insert(ESCAPE_TEXT.into(), ParameterValue::String(text));
                    responses.push(record);
                }
            }
        }
        Ok(Status::OK)
    }
}

enum PutTarget<'a> {
    Object(Hobj),
    Descriptor(&'a mut ObjectDescriptor),
}

fn deliver(delivery: Delivery) -> Outcome<()> {
    let inner = delivery
        .target
        .upgrade()
        .ok_or_else(|| Status::failed(ReasonCode::UNKNOWN_REMOTE_Q_MGR))?;
    let mut state = inner.state.lock();
    match state.queues.get(&delivery.q_name) {
        Some(queue) if queue.definition.q_type == QueueType::Local => {}
        _ => return Err(Status::failed(ReasonCode::UNKNOWN_OBJECT_NAME)),
    }
    state.enqueue(&delivery.q_name, &delivery.md, &delivery.data, None)?;
    drop(state);
    inner.changed.notify_all();
    Ok(())
}

fn attribute(queue: &LocalQueue, selector: Selector) -> AttributeValue {
    let definition = &queue.definition;
    let flag = |value: bool, yes: MqLong, no: MqLong| if value { yes } else { no };
    let count = |value: usize| MqLong::try_from(value).unwrap_or(MqLong::MAX);
    match selector {
        Selector::CurrentQDepth => AttributeValue::Integer(count(queue.depth())),
        Selector::DefInputOpenOption => AttributeValue::Integer(flag(
            definition.default_input_shared,
            MQOO_INPUT_SHARED,
            MQOO_INPUT_EXCLUSIVE,
        )),
        Selector::DefPersistence => AttributeValue::Integer(definition.default_persistence),
        Selector::DefPriority => AttributeValue::Integer(definition.default_priority),
        Selector::DefinitionType => AttributeValue::Integer(definition.definition_type.as_raw()),
        Selector::InhibitGet => AttributeValue::Integer(flag(
            definition.inhibit_get,
            MQQA_GET_INHIBITED,
            MQQA_GET_ALLOWED,
        )),
        Selector::InhibitPut => AttributeValue::Integer(flag(
            definition.inhibit_put,
            MQQA_PUT_INHIBITED,
            MQQA_PUT_ALLOWED,
        )),
        Selector::MaxMsgLength => AttributeValue::Integer(definition.max_msg_length),
        Selector::MaxQDepth => AttributeValue::Integer(definition.max_depth),
        Selector::OpenInputCount => AttributeValue::Integer(count(queue.input_count)),
        Selector::OpenOutputCount => AttributeValue::Integer(count(queue.output_count)),
        Selector::QType => AttributeValue::Integer(definition.q_type.as_raw()),
        Selector::Shareability => AttributeValue::Integer(flag(
            definition.shareable,
            MQQA_SHAREABLE,
            MQQA_NOT_SHAREABLE,
        )),
        Selector::QDesc => AttributeValue::String(definition.description.clone()),
        Selector::QName => AttributeValue::String(definition.name.clone()),
    }
}

impl State {
    /// Key of a live connection
    fn connection(&self, hconn: Hconn) -> Outcome<usize> {
        let key = key_of(hconn.0).ok_or_else(|| Status::failed(ReasonCode::HCONN_ERROR))?;
        match self.connections.get(key) {
            None => Err(Status::failed(ReasonCode::HCONN_ERROR)),
            Some(connection) if connection.broken => {
                Err(Status::failed(ReasonCode::CONNECTION_BROKEN))
            }
            Some(_) => Ok(key),
        }
    }

    /// Key of an object opened on `connection`
    fn object_key(&self, connection: usize, hobj: Hobj) -> Outcome<usize> {
        let key = key_of(hobj.0).ok_or_else(|| Status::failed(ReasonCode::HOBJ_ERROR))?;
        match self.objects.get(key) {
            Some(object) if object.connection == connection => Ok(key),
            _ => Err(Status::failed(ReasonCode::HOBJ_ERROR)),
        }
    }

    fn check_quiescing(&self, fail_if_quiescing: bool) -> Outcome<()> {
        if self.quiescing && fail_if_quiescing {
            return Err(Status::failed(ReasonCode::Q_MGR_QUIESCING));
        }
        Ok(())
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// `AMQ ` followed by the queue manager name and a counter
    fn next_id(&mut self, q_mgr_name: &str) -> MessageId {
        self.msg_counter += 1;
        let mut id = MQMI_NONE;
        id[..4].copy_from_slice(b"AMQ ");
        let mut name = [b' '; 12];
        for (slot, byte) in name.iter_mut().zip(q_mgr_name.bytes()) {
            *slot = byte;
        }
        id[4..16].copy_from_slice(&name);
        id[16..].copy_from_slice(&self.msg_counter.to_be_bytes());
        id
    }

    /// Name of a new dynamic queue. A template ending in `*` is completed
    /// with a unique suffix.
    fn dynamic_name(&mut self, template: &str) -> Outcome<String> {
        let template = template.trim();
        let name = match template.strip_suffix('*') {
            Some(prefix) => {
                self.dynamic_counter += 1;
                let unique = (self.dynamic_counter << 32) ^ self.sequence;
                format!("{}{:016X}", prefix, unique)
                    .chars()
                    .take(MQ_Q_NAME_LENGTH)
                    .collect()
            }
            None => template.to_string(),
        };
        if name.is_empty() || name.len() > MQ_Q_NAME_LENGTH || name.contains('*') {
            return Err(Status::failed(ReasonCode::DYNAMIC_Q_NAME_ERROR));
        }
        Ok(name)
    }

    /// Validates a descriptor for put and fills the fields the queue manager
    /// assigns
    fn stamp(&mut self, q_mgr_name: &str, md: &mut MessageDescriptor, options: MqLong) -> Outcome<()> {
        if md.msg_type == MQMT_REQUEST && md.reply_to_q.trim().is_empty() {
            return Err(Status::failed(ReasonCode::MISSING_REPLY_TO_Q));
        }
        if !md.reply_to_q.trim().is_empty() && md.reply_to_q_mgr.trim().is_empty() {
            md.reply_to_q_mgr = q_mgr_name.to_string();
        }
        if options & MQPMO_NEW_MSG_ID != 0 || md.msg_id == MQMI_NONE {
            md.msg_id = self.next_id(q_mgr_name);
        }
        if options & MQPMO_NEW_CORREL_ID != 0 {
            md.correl_id = self.next_id(q_mgr_name);
        }
        let now = chrono::Utc::now();
        md.put_date = now.format("%Y%m%d").to_string();
        md.put_time = format!(
            "{}{:02}",
            now.format("%H%M%S"),
            now.timestamp_subsec_millis() / 10
        );
        md.backout_count = 0;
        Ok(())
    }

    /// Stores a message on a local queue
    fn enqueue(
        &mut self,
        q_name: &str,
        md: &MessageDescriptor,
        data: &[u8],
        pending: Option<usize>,
    ) -> Outcome<u64> {
        let queue = self
            .queues
            .get(q_name)
            .ok_or_else(|| Status::failed(ReasonCode::UNKNOWN_OBJECT_NAME))?;
        let definition = &queue.definition;
        if definition.inhibit_put {
            return Err(Status::failed(ReasonCode::PUT_INHIBITED));
        }
        if data.len() > usize::try_from(definition.max_msg_length).unwrap_or(0) {
            return Err(Status::failed(ReasonCode::MSG_TOO_BIG_FOR_Q));
        }
        if queue.is_full() {
            return Err(Status::failed(ReasonCode::Q_FULL));
        }

        let mut md = md.clone();
        if md.priority == MQPRI_PRIORITY_AS_Q_DEF {
            md.priority = definition.default_priority;
        }
        if md.persistence == MQPER_PERSISTENCE_AS_Q_DEF {
            md.persistence = definition.default_persistence;
        }
        let sequence = self.next_sequence();
        let visibility = pending.map_or(Visibility::Committed, Visibility::Put);
        if let Some(queue) = self.queues.get_mut(q_name) {
            queue.messages.push_back(StoredMessage {
                sequence,
                md,
                data: data.to_vec(),
                visibility,
            });
        }
        Ok(sequence)
    }

    /// Runs one get attempt. `None` means no message is available yet.
    fn take(
        &mut self,
        connection: usize,
        key: usize,
        md: &mut MessageDescriptor,
        gmo: &mut GetOptions,
        buffer: &mut [u8],
        data_length: &mut usize,
    ) -> Outcome<Option<Status>> {
        let options = gmo.options;
        let browse = options & MQGMO_BROWSE_ANY != 0;
        if options & MQGMO_BROWSE_FIRST != 0 && options & MQGMO_BROWSE_NEXT != 0 {
            return Err(Status::failed(ReasonCode::OPTIONS_ERROR));
        }

        let object = &mut self.objects[key];
        if browse && object.options & MQOO_BROWSE == 0 {
            return Err(Status::failed(ReasonCode::NOT_OPEN_FOR_BROWSE));
        }
        if !browse && object.options & MQOO_INPUT_ANY == 0 {
            return Err(Status::failed(ReasonCode::NOT_OPEN_FOR_INPUT));
        }
        let queue = self
            .queues
            .get_mut(&object.q_name)
            .ok_or_else(|| Status::failed(ReasonCode::Q_DELETED))?;
        if queue.definition.inhibit_get {
            return Err(Status::failed(ReasonCode::GET_INHIBITED));
        }

        let index = if options & (MQGMO_BROWSE_MSG_UNDER_CURSOR | MQGMO_MSG_UNDER_CURSOR) != 0 {
            let under_cursor = object
                .cursor
                .and_then(|sequence| queue.position(sequence))
                .filter(|index| queue.messages[*index].is_visible());
            match under_cursor {
                Some(index) => index,
                None => return Err(Status::failed(ReasonCode::NO_MSG_UNDER_CURSOR)),
            }
        } else {
            let after = if options & MQGMO_BROWSE_NEXT != 0 {
                object.cursor
            } else {
                None
            };
            match queue.find(after, gmo) {
                Some(index) => index,
                None => {
                    if options & MQGMO_BROWSE_FIRST != 0 {
                        object.cursor = None;
                    }
                    return Ok(None);
                }
            }
        };

        let stored = &queue.messages[index];
        let sequence = stored.sequence;
        *md = stored.md.clone();
        *data_length = stored.data.len();
        let copied = stored.data.len().min(buffer.len());
        buffer[..copied].copy_from_slice(&stored.data[..copied]);
        gmo.resolved_q_name = queue.definition.name.clone();

        let truncated = stored.data.len() > buffer.len();
        if truncated && options & MQGMO_ACCEPT_TRUNCATED_MSG == 0 {
            return Ok(Some(Status::failed(ReasonCode::TRUNCATED_MSG_FAILED)));
        }

        if browse {
            object.cursor = Some(sequence);
        } else if options & MQGMO_SYNCPOINT != 0 {
            queue.messages[index].visibility = Visibility::Got(connection);
            let q_name = queue.definition.name.clone();
            if let Some(connection) = self.connections.get_mut(connection) {
                connection.uow.push(Pending::Get { q_name, sequence });
            }
        } else {
            queue.messages.remove(index);
        }

        Ok(Some(if truncated {
            Status::warning(ReasonCode::TRUNCATED_MSG_ACCEPTED)
        } else {
            Status::OK
        }))
    }

    /// Makes the connection's pending work permanent and returns the
    /// messages bound for linked queue managers
    fn commit(&mut self, key: usize) -> Vec<Delivery> {
        let uow = match self.connections.get_mut(key) {
            Some(connection) => {
                connection.global_uow = false;
                std::mem::take(&mut connection.uow)
            }
            None => return Vec::new(),
        };
        let mut deliveries = Vec::new();
        for pending in uow {
            match pending {
                Pending::Put { q_name, sequence } => {
                    if let Some(message) = self
                        .queues
                        .get_mut(&q_name)
                        .and_then(|queue| queue.get_mut(sequence))
                    {
                        message.visibility = Visibility::Committed;
                    }
                }
                Pending::Get { q_name, sequence } => {
                    if let Some(queue) = self.queues.get_mut(&q_name) {
                        queue.remove(sequence);
                    }
                }
                Pending::Remote(delivery) => deliveries.push(delivery),
            }
        }
        deliveries
    }

    /// Undoes the connection's pending work. Messages got under syncpoint
    /// return to the queue with their backout count raised.
    fn backout(&mut self, key: usize) {
        let uow = match self.connections.get_mut(key) {
            Some(connection) => {
                connection.global_uow = false;
                std::mem::take(&mut connection.uow)
            }
            None => return,
        };
        for pending in uow {
            match pending {
                Pending::Put { q_name, sequence } => {
                    if let Some(queue) = self.queues.get_mut(&q_name) {
                        queue.remove(sequence);
                    }
                }
                Pending::Get { q_name, sequence } => {
                    if let Some(message) = self
                        .queues
                        .get_mut(&q_name)
                        .and_then(|queue| queue.get_mut(sequence))
                    {
                        message.visibility = Visibility::Committed;
                        message.md.backout_count += 1;
                    }
                }
                Pending::Remote(_) => {}
            }
        }
    }

    /// Releases an object, deleting its queue when asked to or when it
    /// created a temporary dynamic queue
    fn close_object(&mut self, key: usize, options: MqLong) -> Outcome<()> {
        let object = &self.objects[key];
        let delete = options & (MQCO_DELETE | MQCO_DELETE_PURGE) != 0;
        if object.remote.is_some() {
            if delete {
                return Err(Status::failed(ReasonCode::OPTION_NOT_VALID_FOR_TYPE));
            }
            self.objects.remove(key);
            return Ok(());
        }

        let mut remove_queue = false;
        if let Some(queue) = self.queues.get(&object.q_name) {
            let dynamic = queue.definition.definition_type != DefinitionType::Predefined;
            if delete {
                if !dynamic {
                    return Err(Status::failed(ReasonCode::OPTION_NOT_VALID_FOR_TYPE));
                }
                if queue.open_count > 1 {
                    return Err(Status::failed(ReasonCode::OBJECT_IN_USE));
                }
                if options & MQCO_DELETE_PURGE == 0 && queue.depth() > 0 {
                    return Err(Status::failed(ReasonCode::Q_NOT_EMPTY));
                }
            }
            remove_queue = delete || queue.creator == Some(key);
        }

        let object = self.objects.remove(key);
        if remove_queue {
            self.queues.remove(&object.q_name);
        } else if let Some(queue) = self.queues.get_mut(&object.q_name) {
            queue.open_count = queue.open_count.saturating_sub(1);
            if object.options & MQOO_INPUT_ANY != 0 {
                queue.input_count = queue.input_count.saturating_sub(1);
                if object.exclusive {
                    queue.exclusive = false;
                }
            }
            if object.options & MQOO_OUTPUT != 0 {
                queue.output_count = queue.output_count.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Commits, closes every object of the connection and removes it
    fn disconnect(&mut self, key: usize) -> Vec<Delivery> {
        let deliveries = self.commit(key);
        let objects: Vec<usize> = self
            .objects
            .iter()
            .filter(|(_, object)| object.connection == key)
            .map(|(object, _)| object)
            .collect();
        for object in objects {
            if self.close_object(object, 0).is_err() {
                self.objects.remove(object);
            }
        }
        if self.connections.contains(key) {
            self.connections.remove(key);
        }
        deliveries
    }

    fn define(&mut self, definition: QueueDefinition, replace: bool) -> Result<(), ReasonCode> {
        match self.queues.get_mut(&definition.name) {
            Some(queue) if replace => {
                if queue.definition.q_type != definition.q_type {
                    return Err(ReasonCode::Q_TYPE_ERROR);
                }
                queue.definition = definition;
                Ok(())
            }
            Some(_) => Err(ReasonCode::OBJECT_ALREADY_EXISTS),
            None => {
                self.queues
                    .insert(definition.name.clone(), LocalQueue::new(definition));
                Ok(())
            }
        }
    }

    fn delete(&mut self, q_name: &str, purge: bool) -> Result<(), ReasonCode> {
        let queue = self
            .queues
            .get(q_name)
            .ok_or(ReasonCode::UNKNOWN_OBJECT_NAME)?;
        if queue.open_count > 0 || queue.has_uncommitted() {
            return Err(ReasonCode::OBJECT_IN_USE);
        }
        if !purge && queue.depth() > 0 {
            return Err(ReasonCode::Q_NOT_EMPTY);
        }
        self.queues.remove(q_name);
        Ok(())
    }

    fn clear(&mut self, q_name: &str) -> Result<(), ReasonCode> {
        let queue = self
            .queues
            .get_mut(q_name)
            .ok_or(ReasonCode::UNKNOWN_OBJECT_NAME)?;
        if queue.definition.q_type != QueueType::Local {
            return Err(ReasonCode::Q_TYPE_ERROR);
        }
        if queue.input_count > 0 || !queue.clear() {
            return Err(ReasonCode::OBJECT_IN_USE);
        }
        Ok(())
    }

    fn queue_names(&self, generic: &str, q_type: MqLong) -> Vec<String> {
        self.queues
            .values()
            .filter(|queue| q_type == MQQT_ALL || queue.definition.q_type.as_raw() == q_type)
            .filter(|queue| matches_generic(generic, &queue.definition.name))
            .map(|queue| queue.definition.name.clone())
            .collect()
    }
}

impl Mqi for LocalQueueManager {
    fn connx(&self, q_mgr_name: &str, options: &ConnectOptions, hconn: &mut Hconn) -> Status {
        let q_mgr_name = q_mgr_name.trim();
        if !q_mgr_name.is_empty() && q_mgr_name != self.inner.name {
            return Status::failed(ReasonCode::Q_MGR_NAME_ERROR);
        }
        if let Some(cd) = &options.client {
            if cd.connection_name.trim().is_empty() {
                return Status::failed(ReasonCode::CLIENT_CONN_ERROR);
            }
        }
        let mut state = self.inner.state.lock();
        if state.quiescing {
            return Status::failed(ReasonCode::Q_MGR_NOT_AVAILABLE);
        }
        let key = state.connections.insert(Connection::default());
        *hconn = Hconn(raw_of(key));
        Status::OK
    }

    fn disc(&self, hconn: &mut Hconn) -> Status {
        let mut state = self.inner.state.lock();
        let key = match key_of(hconn.0).filter(|key| state.connections.contains(*key)) {
            Some(key) => key,
            None => return Status::failed(ReasonCode::HCONN_ERROR),
        };
        let broken = state.connections[key].broken;
        let deliveries = state.disconnect(key);
        drop(state);
        *hconn = Hconn::UNUSABLE;
        self.inner.changed.notify_all();
        self.deliver_all(deliveries);
        if broken {
            return Status::failed(ReasonCode::CONNECTION_BROKEN);
        }
        Status::OK
    }

    fn open(&self, hconn: Hconn, od: &mut ObjectDescriptor, options: MqLong, hobj: &mut Hobj) -> Status {
        outcome(self.open_inner(hconn, od, options, hobj))
    }

    fn close(&self, hconn: Hconn, hobj: &mut Hobj, options: MqLong) -> Status {
        outcome(self.close_inner(hconn, hobj, options))
    }

    fn put(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status {
        outcome(self.put_inner(hconn, PutTarget::Object(hobj), md, pmo, buffer))
    }

    fn put1(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status {
        outcome(self.put_inner(hconn, PutTarget::Descriptor(od), md, pmo, buffer))
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
        outcome(self.get_inner(hconn, hobj, md, gmo, buffer, data_length))
    }

    fn inq(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        selectors: &[Selector],
        values: &mut Vec<AttributeValue>,
    ) -> Status {
        outcome(self.inq_inner(hconn, hobj, selectors, values))
    }

    fn begin(&self, hconn: Hconn) -> Status {
        let mut state = self.inner.state.lock();
        let key = match state.connection(hconn) {
            Ok(key) => key,
            Err(status) => return status,
        };
        let connection = &mut state.connections[key];
        if connection.global_uow || !connection.uow.is_empty() {
            return Status::failed(ReasonCode::UOW_IN_PROGRESS);
        }
        connection.global_uow = true;
        Status::warning(ReasonCode::NO_EXTERNAL_PARTICIPANTS)
    }

    fn cmit(&self, hconn: Hconn) -> Status {
        let mut state = self.inner.state.lock();
        let key = match state.connection(hconn) {
            Ok(key) => key,
            Err(status) => return status,
        };
        let deliveries = state.commit(key);
        drop(state);
        self.inner.changed.notify_all();
        self.deliver_all(deliveries);
        Status::OK
    }

    fn back(&self, hconn: Hconn) -> Status {
        let mut state = self.inner.state.lock();
        let key = match state.connection(hconn) {
            Ok(key) => key,
            Err(status) => return status,
        };
        state.backout(key);
        drop(state);
        self.inner.changed.notify_all();
        Status::OK
    }

    fn execute(&self, hconn: Hconn, command: &Command, responses: &mut Vec<Parameters>) -> Status {
        outcome(self.execute_inner(hconn, command, responses))
    }
}
