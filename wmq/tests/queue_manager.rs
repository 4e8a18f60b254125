//! Tests connection handling against the in-process queue manager

#![cfg(feature = "local")]

use std::cell::Cell;

use wmq::{
    command::{Command, Parameters},
    local::{LocalQueueManager, QueueDefinition},
    mqi::{Hconn, Hobj, Mqi, Status},
    queue, Error, ErrorKind, PutParams, QueueManager,
};
use wmq_types::{
    constants::{MqLong, MQOO_INQUIRE, MQPER_PERSISTENT, MQQT_LOCAL},
    options::{AttributeValue, ConnectOptions, GetOptions, ObjectDescriptor, PutOptions, Selector},
    CompletionCode, Message, MessageDescriptor, ReasonCode,
};

mod common;

use common::{connect, setup_queue_manager, APP_Q, Q_MGR_NAME};

#[test]
fn connect_and_disconnect() {
    let qmgr = setup_queue_manager();
    let mut conn = QueueManager::<&LocalQueueManager>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .build(&qmgr);
    assert!(!conn.is_connected());

    assert!(conn.connect().unwrap());
    assert!(conn.is_connected());
    assert_eq!(conn.comp_code(), CompletionCode::Ok);
    assert_eq!(qmgr.connection_count(), 1);

    assert!(conn.disconnect().unwrap());
    assert!(!conn.is_connected());
    assert_eq!(qmgr.connection_count(), 0);

    // Disconnecting again does nothing
    assert!(conn.disconnect().unwrap());
}

#[test]
fn operations_require_a_connection() {
    let qmgr = setup_queue_manager();
    let conn = QueueManager::<&LocalQueueManager>::builder().build(&qmgr);
    let err = conn.commit().unwrap_err();
    assert_eq!(err, Error::NotConnected);
    assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
}

#[test]
fn connect_to_unknown_queue_manager_fails() {
    let qmgr = setup_queue_manager();

    // The scoped helper reports the failure whatever the error policy
    let err = QueueManager::<&LocalQueueManager>::builder()
        .q_mgr_name("QM9")
        .exception_on_error(false)
        .connect(&qmgr)
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::Q_MGR_NAME_ERROR));

    let mut conn = QueueManager::<&LocalQueueManager>::builder()
        .q_mgr_name("QM9")
        .exception_on_error(false)
        .build(&qmgr);
    assert!(!conn.connect().unwrap());
    assert_eq!(conn.comp_code(), CompletionCode::Failed);
    assert_eq!(conn.reason_code(), ReasonCode::Q_MGR_NAME_ERROR);
    assert_eq!(conn.reason(), "MQRC_Q_MGR_NAME_ERROR");
}

#[test]
fn client_connection_requires_connection_name() {
    let qmgr = setup_queue_manager();
    let err = QueueManager::<&LocalQueueManager>::builder()
        .channel_name("SYSTEM.DEF.SVRCONN")
        .connect(&qmgr)
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn quiescing_queue_manager_refuses_connections() {
    let qmgr = setup_queue_manager();
    qmgr.quiesce();
    let err = QueueManager::<&LocalQueueManager>::builder().connect(&qmgr).unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::Q_MGR_NOT_AVAILABLE));
    assert!(err.is_retryable());
}

#[test]
fn scoped_connection_backs_out_on_error() {
    let qmgr = setup_queue_manager();

    let result: Result<(), Error> = QueueManager::<&LocalQueueManager>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .connect_with(&qmgr, |conn| {
            conn.put(APP_Q, &mut Message::with_data("lost"), &PutParams::new().sync(true))?;
            Err(Error::Config("application failure".into()))
        });
    assert!(matches!(result, Err(Error::Config(_))));
    assert_eq!(qmgr.depth(APP_Q), Some(0));
    assert_eq!(qmgr.connection_count(), 0);

    QueueManager::<&LocalQueueManager>::builder()
        .connect_with(&qmgr, |conn| {
            conn.put(APP_Q, &mut Message::with_data("kept"), &PutParams::new().sync(true))?;
            conn.commit()
        })
        .unwrap();
    assert_eq!(qmgr.depth(APP_Q), Some(1));
    assert_eq!(qmgr.connection_count(), 0);
}

#[test]
fn scoped_connection_backs_out_uncommitted_work() {
    let qmgr = setup_queue_manager();
    QueueManager::<&LocalQueueManager>::builder()
        .connect_with(&qmgr, |conn| {
            conn.put(APP_Q, &mut Message::with_data("pending"), &PutParams::new().sync(true))
        })
        .unwrap();
    assert_eq!(qmgr.depth(APP_Q), Some(0));
}

#[test]
fn dropping_a_connection_releases_it() {
    let qmgr = setup_queue_manager();
    {
        let conn = connect(&qmgr);
        conn.put(APP_Q, &mut Message::with_data("pending"), &PutParams::new().sync(true))
            .unwrap();
        assert_eq!(qmgr.connection_count(), 1);
    }
    assert_eq!(qmgr.connection_count(), 0);
    assert_eq!(qmgr.depth(APP_Q), Some(0));
}

#[test]
fn single_put_assigns_identity() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut message = Message::builder()
        .persistence(MQPER_PERSISTENT)
        .data("hello")
        .build();
    assert!(conn.put(APP_Q, &mut message, &PutParams::new()).unwrap());
    assert_ne!(message.descriptor.msg_id, [0; 24]);
    assert_eq!(&message.descriptor.msg_id[..4], b"AMQ ");
    assert_eq!(message.descriptor.put_date.len(), 8);
    assert_eq!(message.descriptor.put_time.len(), 8);

    let first = message.descriptor.msg_id;
    conn.put(APP_Q, &mut message, &PutParams::new()).unwrap();
    assert_ne!(message.descriptor.msg_id, first);

    // The identifier is kept when no new one is requested
    let kept = message.descriptor.msg_id;
    conn.put(APP_Q, &mut message, &PutParams::new().new_msg_id(false))
        .unwrap();
    assert_eq!(message.descriptor.msg_id, kept);
    assert_eq!(qmgr.depth(APP_Q), Some(3));
}

#[test]
fn single_put_failures_follow_error_policy() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let err = conn
        .put("MISSING.QUEUE", &mut Message::with_data("x"), &PutParams::new())
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::UNKNOWN_OBJECT_NAME));
    assert_eq!(conn.reason_code(), ReasonCode::UNKNOWN_OBJECT_NAME);

    let conn = QueueManager::<&LocalQueueManager>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .exception_on_error(false)
        .connect(&qmgr)
        .unwrap();
    assert!(!conn
        .put("MISSING.QUEUE", &mut Message::with_data("x"), &PutParams::new())
        .unwrap());
    assert_eq!(conn.comp_code(), CompletionCode::Failed);
    assert_eq!(conn.reason_code(), ReasonCode::UNKNOWN_OBJECT_NAME);

    // A model queue cannot be the target of a single put
    assert!(!conn
        .put(
            "SYSTEM.DEFAULT.MODEL.QUEUE",
            &mut Message::with_data("x"),
            &PutParams::new()
        )
        .unwrap());
    assert_eq!(conn.reason_code(), ReasonCode::Q_TYPE_ERROR);
}

#[test]
fn begin_reports_warning_without_participants() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    assert!(conn.begin().unwrap());
    assert_eq!(conn.comp_code(), CompletionCode::Warning);
    assert_eq!(conn.reason_code(), ReasonCode::NO_EXTERNAL_PARTICIPANTS);

    let err = conn.begin().unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::UOW_IN_PROGRESS));
    assert!(conn.commit().unwrap());
    assert!(conn.begin().unwrap());
}

#[test]
fn broken_connection_is_reported() {
    let qmgr = setup_queue_manager();
    let mut conn = connect(&qmgr);
    conn.put(APP_Q, &mut Message::with_data("x"), &PutParams::new().sync(true))
        .unwrap();
    qmgr.break_connections();

    let err = conn.commit().unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::CONNECTION_BROKEN));
    assert_eq!(err.kind(), ErrorKind::Transient);
    assert_eq!(qmgr.depth(APP_Q), Some(0));

    assert!(conn.disconnect().is_err());
    assert!(!conn.is_connected());
    assert_eq!(qmgr.connection_count(), 0);
}

#[test]
fn mqsc_commands() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);

    let responses = conn
        .mqsc("DEFINE QLOCAL(APP.ORDERS) MAXDEPTH(2) DESCR('Order intake')")
        .unwrap();
    assert_eq!(responses, vec!["AMQ8006I: WebSphere MQ queue created."]);
    assert_eq!(qmgr.depth("APP.ORDERS"), Some(0));

    let responses = conn.mqsc("DISPLAY QLOCAL(APP.ORDERS)").unwrap();
    assert_eq!(responses.len(), 1);
    assert!(responses[0].contains("DESCR(Order intake)"));

    // Command failures are reported in the response text
    let responses = conn.mqsc("DEFINE QLOCAL(APP.ORDERS)").unwrap();
    assert_eq!(responses, vec!["AMQ8150E: WebSphere MQ object already exists."]);
    assert_eq!(conn.comp_code(), CompletionCode::Ok);

    let mut queue = conn
        .open_queue(queue::Builder::new("APP.ORDERS").mode(queue::Mode::Output))
        .unwrap();
    queue.put(&mut Message::with_data("1"), &PutParams::new()).unwrap();
    queue.put(&mut Message::with_data("2"), &PutParams::new()).unwrap();
    let err = queue
        .put(&mut Message::with_data("3"), &PutParams::new())
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::Q_FULL));
    drop(queue);

    let responses = conn.mqsc("CLEAR QLOCAL(APP.ORDERS)").unwrap();
    assert_eq!(responses, vec!["AMQ8022I: WebSphere MQ queue cleared."]);
    let responses = conn.mqsc("DELETE QLOCAL(APP.ORDERS)").unwrap();
    assert_eq!(responses, vec!["AMQ8007I: WebSphere MQ queue deleted."]);
    assert_eq!(qmgr.depth("APP.ORDERS"), None);
}

#[test]
fn execute_named_commands() {
    use wmq::command::{Command, ParameterValue, Parameters, Q_NAMES};

    let qmgr = setup_queue_manager();
    qmgr.define(QueueDefinition::local("APP.OTHER")).unwrap();
    let conn = connect(&qmgr);

    assert!(conn.execute(&Command::PingQueueManager).unwrap().is_empty());

    let mut parameters = Parameters::new();
    parameters.insert("q_name".into(), "APP.*".into());
    parameters.insert("q_type".into(), MQQT_LOCAL.into());
    let responses = conn.execute_command("inquire_q_names", &parameters).unwrap();
    assert_eq!(
        responses[0].get(Q_NAMES),
        Some(&ParameterValue::StringList(vec![
            "APP.OTHER".to_string(),
            APP_Q.to_string(),
        ]))
    );

    let err = conn
        .execute_command("start_channel", &Parameters::new())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownName(_)));

    let err = conn
        .execute(&Command::ClearQueue {
            q_name: "MISSING.QUEUE".into(),
        })
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::UNKNOWN_OBJECT_NAME));
}

#[test]
fn linked_queue_managers_route_puts() {
    let qm1 = setup_queue_manager();
    let qm2 = LocalQueueManager::new("QM2");
    qm2.define(QueueDefinition::local("REMOTE.IN")).unwrap();
    qm1.link(&qm2);

    let conn = connect(&qm1);
    let destination = wmq_types::Destination::remote("REMOTE.IN", "QM2");
    conn.put(destination.clone(), &mut Message::with_data("now"), &PutParams::new())
        .unwrap();
    assert_eq!(qm2.depth("REMOTE.IN"), Some(1));

    // Puts under syncpoint are delivered when the unit of work commits
    conn.put(destination, &mut Message::with_data("later"), &PutParams::new().sync(true))
        .unwrap();
    assert_eq!(qm2.depth("REMOTE.IN"), Some(1));
    conn.commit().unwrap();
    assert_eq!(qm2.depth("REMOTE.IN"), Some(2));

    let err = conn
        .put(
            wmq_types::Destination::remote("REMOTE.IN", "QM3"),
            &mut Message::with_data("x"),
            &PutParams::new(),
        )
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::UNKNOWN_REMOTE_Q_MGR));

    // Remote queues are put-only
    let err = conn
        .open_queue(
            queue::Builder::new(wmq_types::Destination::remote("REMOTE.IN", "QM2"))
                .mode(queue::Mode::InputShared),
        )
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::OPTION_NOT_VALID_FOR_TYPE));

    let conn2 = QueueManager::<&LocalQueueManager>::builder().q_mgr_name("QM2").connect(&qm2).unwrap();
    let mut queue = conn2
        .open_queue(
            queue::Builder::new("REMOTE.IN")
                .mode(queue::Mode::Input)
                .open_options(MQOO_INQUIRE),
        )
        .unwrap();
    let mut message = Message::new();
    assert!(queue.get(&mut message, &GetOptions::default()).unwrap());
    assert_eq!(message.data, b"now");
    assert_eq!(
        queue.inquire(&[Selector::CurrentQDepth]).unwrap()[&Selector::CurrentQDepth]
            .as_integer(),
        Some(1)
    );
}

/// Delegates to a local queue manager but fails the first `disc` calls
/// without releasing the connection
#[derive(Debug)]
struct FailingDisconnect<'a> {
    qmgr: &'a LocalQueueManager,
    failures: Cell<usize>,
}

impl<'a> FailingDisconnect<'a> {
    fn new(qmgr: &'a LocalQueueManager, failures: usize) -> Self {
        Self {
            qmgr,
            failures: Cell::new(failures),
        }
    }
}

impl Mqi for FailingDisconnect<'_> {
    fn connx(&self, q_mgr_name: &str, options: &ConnectOptions, hconn: &mut Hconn) -> Status {
        self.qmgr.connx(q_mgr_name, options, hconn)
    }

    fn disc(&self, hconn: &mut Hconn) -> Status {
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Status::failed(ReasonCode::CALL_IN_PROGRESS);
        }
        self.qmgr.disc(hconn)
    }

    fn open(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        options: MqLong,
        hobj: &mut Hobj,
    ) -> Status {
        self.qmgr.open(hconn, od, options, hobj)
    }

    fn close(&self, hconn: Hconn, hobj: &mut Hobj, options: MqLong) -> Status {
        self.qmgr.close(hconn, hobj, options)
    }

    fn put(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status {
        self.qmgr.put(hconn, hobj, md, pmo, buffer)
    }

    fn put1(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status {
        self.qmgr.put1(hconn, od, md, pmo, buffer)
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
        self.qmgr.get(hconn, hobj, md, gmo, buffer, data_length)
    }

    fn inq(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        selectors: &[Selector],
        values: &mut Vec<AttributeValue>,
    ) -> Status {
        self.qmgr.inq(hconn, hobj, selectors, values)
    }

    fn begin(&self, hconn: Hconn) -> Status {
        self.qmgr.begin(hconn)
    }

    fn cmit(&self, hconn: Hconn) -> Status {
        self.qmgr.cmit(hconn)
    }

    fn back(&self, hconn: Hconn) -> Status {
        self.qmgr.back(hconn)
    }

    fn execute(&self, hconn: Hconn, command: &Command, responses: &mut Vec<Parameters>) -> Status {
        self.qmgr.execute(hconn, command, responses)
    }
}

#[test]
fn failed_disconnect_keeps_the_connection_for_retry() {
    let qmgr = setup_queue_manager();
    let mut conn = QueueManager::<FailingDisconnect<'_>>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .connect(FailingDisconnect::new(&qmgr, 1))
        .unwrap();

    let err = conn.disconnect().unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::CALL_IN_PROGRESS));
    assert!(err.is_retryable());
    assert!(conn.is_connected());
    assert_eq!(qmgr.connection_count(), 1);

    assert!(conn.disconnect().unwrap());
    assert!(!conn.is_connected());
    assert_eq!(qmgr.connection_count(), 0);
}

#[test]
fn dropping_after_failed_disconnect_releases_the_connection() {
    let qmgr = setup_queue_manager();
    let mut conn = QueueManager::<FailingDisconnect<'_>>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .exception_on_error(false)
        .connect(FailingDisconnect::new(&qmgr, 1))
        .unwrap();

    assert!(!conn.disconnect().unwrap());
    assert_eq!(conn.reason_code(), ReasonCode::CALL_IN_PROGRESS);
    drop(conn);
    assert_eq!(qmgr.connection_count(), 0);
}

#[test]
fn scoped_connection_reports_failed_release() {
    let qmgr = setup_queue_manager();
    let err = QueueManager::<FailingDisconnect<'_>>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .exception_on_error(false)
        .connect_with(FailingDisconnect::new(&qmgr, 1), |_conn| Ok::<_, Error>(()))
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::CALL_IN_PROGRESS));
    // The handle is dropped at the end of the scope and retries the release
    assert_eq!(qmgr.connection_count(), 0);
}

#[test]
fn drop_survives_a_release_that_keeps_failing() {
    let qmgr = setup_queue_manager();
    let conn = QueueManager::<FailingDisconnect<'_>>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .connect(FailingDisconnect::new(&qmgr, usize::MAX))
        .unwrap();
    assert!(conn.is_connected());

    // The failure is logged and the drop completes
    drop(conn);
    assert_eq!(qmgr.connection_count(), 1);
}
