//! Tests reply and dead-letter routing against the in-process queue manager

#![cfg(feature = "local")]

use wmq::{
    local::{LocalQueueManager, QueueDefinition},
    queue::{self, Mode},
    Error, PutParams, QueueManager,
};
use wmq_types::{
    constants::{
        DEFAULT_DEAD_LETTER_Q_NAME, MQMT_DATAGRAM, MQMT_REPLY, MQMT_REQUEST, MQPER_PERSISTENT,
        MQRO_PASS_CORREL_ID,
    },
    header::{DeadLetterHeader, Rfh2Header},
    options::GetOptions,
    Format, Header, Message, ReasonCode,
};

mod common;

use common::{connect, setup_queue_manager, APP_Q, Q_MGR_NAME, REPLY_Q};

fn request() -> Message {
    Message::builder()
        .msg_type(MQMT_REQUEST)
        .persistence(MQPER_PERSISTENT)
        .priority(4)
        .format(Format::STRING)
        .reply_to(REPLY_Q, Q_MGR_NAME)
        .header(Rfh2Header {
            folders: vec!["<usr><trace>42</trace></usr>".to_string()],
            ..Default::default()
        })
        .data("ping")
        .build()
}

fn receive(conn: &QueueManager<&LocalQueueManager>, q_name: &str) -> Message {
    let mut queue = conn
        .open_queue(queue::Builder::new(q_name).mode(Mode::Input))
        .unwrap();
    let mut message = Message::new();
    assert!(queue.get(&mut message, &GetOptions::default()).unwrap());
    message
}

#[test]
fn reply_reaches_reply_queue() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);

    let mut sent = request();
    conn.put(APP_Q, &mut sent, &PutParams::new()).unwrap();
    let request = receive(&conn, APP_Q);
    assert_eq!(request.descriptor.msg_id, sent.descriptor.msg_id);

    let mut reply = Message::with_data("pong");
    assert!(conn.put_to_reply_q(&request, &mut reply, &PutParams::new()).unwrap());

    let received = receive(&conn, REPLY_Q);
    assert_eq!(received.descriptor.msg_type, MQMT_REPLY);
    assert_eq!(received.descriptor.correl_id, sent.descriptor.msg_id);
    assert_eq!(received.descriptor.persistence, MQPER_PERSISTENT);
    assert_eq!(received.descriptor.priority, 4);
    assert_eq!(received.descriptor.format, Format::STRING);
    assert_eq!(received.headers, request.headers);
    assert_eq!(received.data, b"pong");
}

#[test]
fn reply_passes_correlation_id_on_request() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);

    let mut sent = request();
    sent.descriptor.report = MQRO_PASS_CORREL_ID;
    sent.descriptor.correl_id = [9; 24];
    conn.put(APP_Q, &mut sent, &PutParams::new()).unwrap();
    let request = receive(&conn, APP_Q);

    conn.put_to_reply_q(&request, &mut Message::with_data("pong"), &PutParams::new())
        .unwrap();
    let received = receive(&conn, REPLY_Q);
    assert_eq!(received.descriptor.correl_id, [9; 24]);
}

#[test]
fn reply_to_datagram_is_rejected() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);

    let mut datagram = request();
    datagram.descriptor.msg_type = MQMT_DATAGRAM;
    let mut reply = Message::with_data("pong");
    let err = conn
        .put_to_reply_q(&datagram, &mut reply, &PutParams::new())
        .unwrap_err();
    assert!(matches!(err, Error::NotARequest(_)));
    assert_eq!(reply, Message::with_data("pong"));
    assert_eq!(qmgr.depth(REPLY_Q), Some(0));
}

#[test]
fn request_without_reply_queue_is_refused() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut request = Message::builder().msg_type(MQMT_REQUEST).data("ping").build();
    let err = conn.put(APP_Q, &mut request, &PutParams::new()).unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::MISSING_REPLY_TO_Q));
}

#[test]
fn reply_to_remote_queue_manager() {
    let qm1 = setup_queue_manager();
    let qm2 = LocalQueueManager::new("QM2");
    qm2.define(QueueDefinition::local("CLIENT.REPLY")).unwrap();
    qm1.link(&qm2);

    let conn = connect(&qm1);
    let mut sent = Message::builder()
        .msg_type(MQMT_REQUEST)
        .reply_to("CLIENT.REPLY", "QM2")
        .data("ping")
        .build();
    conn.put(APP_Q, &mut sent, &PutParams::new()).unwrap();
    let request = receive(&conn, APP_Q);

    conn.put_to_reply_q(&request, &mut Message::with_data("pong"), &PutParams::new())
        .unwrap();
    assert_eq!(qm2.depth("CLIENT.REPLY"), Some(1));
}

#[test]
fn dead_letter_records_reason_and_destination() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);

    let mut message = Message::builder()
        .format(Format::STRING)
        .data("undeliverable")
        .build();
    assert!(conn
        .put_to_dead_letter_q(
            &mut message,
            ReasonCode::UNKNOWN_OBJECT_NAME.as_raw(),
            "APP.MISSING",
            &PutParams::new()
        )
        .unwrap());
    assert!(matches!(message.headers[0], Header::DeadLetter(_)));
    assert_eq!(qmgr.depth(DEFAULT_DEAD_LETTER_Q_NAME), Some(1));

    let received = receive(&conn, DEFAULT_DEAD_LETTER_Q_NAME);
    match &received.headers[..] {
        [Header::DeadLetter(DeadLetterHeader {
            reason,
            dest_q_name,
            dest_q_mgr_name,
            ..
        })] => {
            assert_eq!(*reason, ReasonCode::UNKNOWN_OBJECT_NAME.as_raw());
            assert_eq!(dest_q_name, "APP.MISSING");
            assert_eq!(dest_q_mgr_name, Q_MGR_NAME);
        }
        headers => panic!("unexpected headers {:?}", headers),
    }
    assert_eq!(received.descriptor.format, Format::STRING);
    assert_eq!(received.data, b"undeliverable");
}

#[test]
fn dead_letter_queue_is_configurable() {
    let qmgr = setup_queue_manager();
    qmgr.define(QueueDefinition::local("APP.DLQ")).unwrap();
    let conn = QueueManager::<&LocalQueueManager>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .dead_letter_q_name("APP.DLQ")
        .connect(&qmgr)
        .unwrap();

    let mut message = Message::with_data("x");
    conn.put_to_dead_letter_q(&mut message, 2053, APP_Q, &PutParams::new())
        .unwrap();
    assert_eq!(qmgr.depth("APP.DLQ"), Some(1));
    assert_eq!(qmgr.depth(DEFAULT_DEAD_LETTER_Q_NAME), Some(0));
}

#[test]
fn dead_letter_header_is_not_propagated_to_replies() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);

    let mut sent = request();
    conn.put_to_dead_letter_q(&mut sent, 2053, APP_Q, &PutParams::new())
        .unwrap();
    let dead = receive(&conn, DEFAULT_DEAD_LETTER_Q_NAME);
    assert_eq!(dead.headers.len(), 2);

    conn.put_to_reply_q(&dead, &mut Message::with_data("pong"), &PutParams::new())
        .unwrap();
    let reply = receive(&conn, REPLY_Q);
    assert_eq!(reply.headers.len(), 1);
    assert!(matches!(reply.headers[0], Header::Rfh2(_)));
}
