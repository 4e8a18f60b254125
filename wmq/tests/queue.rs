//! Tests queue handles against the in-process queue manager

#![cfg(feature = "local")]

use std::time::Duration;

use wmq::{
    local::{LocalQueueManager, QueueDefinition},
    queue::{self, Cursor, Mode},
    Error, PutParams, QueueManager,
};
use wmq_types::{
    constants::{
        MQGMO_BROWSE_FIRST, MQGMO_BROWSE_NEXT, MQGMO_SYNCPOINT, MQOO_INQUIRE, MQOO_OUTPUT,
        MQQT_LOCAL,
    },
    header::Rfh2Header,
    options::{AttributeValue, GetOptions, Selector},
    CompletionCode, Format, Message, ReasonCode,
};

mod common;

use common::{connect, setup_queue_manager, APP_Q, Q_MGR_NAME};

fn input_output(q_name: &str) -> queue::Builder {
    queue::Builder::new(q_name)
        .mode(Mode::InputShared)
        .open_options(MQOO_OUTPUT | MQOO_INQUIRE)
}

#[test]
fn put_then_get() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut queue = conn.open_queue(input_output(APP_Q)).unwrap();
    assert!(queue.is_open());
    assert_eq!(queue.name(), APP_Q);

    let mut message = Message::builder().format(Format::STRING).data("hello").build();
    assert!(queue.put(&mut message, &PutParams::new()).unwrap());
    assert_ne!(message.descriptor.msg_id, [0; 24]);

    let depth = queue.inquire(&[Selector::CurrentQDepth]).unwrap();
    assert_eq!(depth[&Selector::CurrentQDepth], AttributeValue::Integer(1));

    let mut received = Message::new();
    assert!(queue.get(&mut received, &GetOptions::default()).unwrap());
    assert_eq!(received.data, b"hello");
    assert_eq!(received.descriptor.format, Format::STRING);
    assert_eq!(received.descriptor.msg_id, message.descriptor.msg_id);
    assert_eq!(received.descriptor.reply_to_q_mgr, "");
    assert_eq!(queue.comp_code(), CompletionCode::Ok);
}

#[test]
fn get_from_empty_queue_is_not_an_error() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut queue = conn.open_queue(input_output(APP_Q)).unwrap();

    let mut message = Message::with_data("untouched");
    assert!(!queue.get(&mut message, &GetOptions::default()).unwrap());
    assert_eq!(queue.comp_code(), CompletionCode::Warning);
    assert_eq!(queue.reason_code(), ReasonCode::NO_MSG_AVAILABLE);
    assert_eq!(queue.reason(), "MQRC_NO_MSG_AVAILABLE");
    assert_eq!(message.data, b"untouched");
}

#[test]
fn waiting_get_receives_message_put_later() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut queue = conn.open_queue(input_output(APP_Q)).unwrap();

    let producer = qmgr.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        let conn = connect(&producer);
        conn.put(APP_Q, &mut Message::with_data("late"), &PutParams::new())
            .unwrap();
    });

    let mut message = Message::new();
    assert!(queue.get(&mut message, &GetOptions::default().wait(10_000)).unwrap());
    assert_eq!(message.data, b"late");
    handle.join().unwrap();

    // A bounded wait on an empty queue times out
    assert!(!queue.get(&mut message, &GetOptions::default().wait(10)).unwrap());
    let err = queue
        .get(&mut message, &GetOptions::default().wait(-5))
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::WAIT_INTERVAL_ERROR));
}

#[test]
fn large_messages_grow_the_buffer() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut queue = conn.open_queue(input_output(APP_Q)).unwrap();

    let data: Vec<u8> = (0..3 * queue::DEFAULT_BUFFER_SIZE).map(|i| i as u8).collect();
    queue.put(&mut Message::with_data(data.clone()), &PutParams::new()).unwrap();

    let mut message = Message::new();
    assert!(queue.get(&mut message, &GetOptions::default()).unwrap());
    assert_eq!(message.data, data);
    assert_eq!(qmgr.depth(APP_Q), Some(0));
}

#[test]
fn match_by_correlation_id() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut queue = conn.open_queue(input_output(APP_Q)).unwrap();

    for (correl_id, data) in [([1; 24], "one"), ([2; 24], "two")] {
        let mut message = Message::builder().correl_id(correl_id).data(data).build();
        queue.put(&mut message, &PutParams::new()).unwrap();
    }

    let options = GetOptions {
        correl_id: [2; 24],
        ..Default::default()
    };
    let mut message = Message::new();
    assert!(queue.get(&mut message, &options).unwrap());
    assert_eq!(message.data, b"two");
    assert_eq!(message.descriptor.correl_id, [2; 24]);
    assert!(!queue.get(&mut message, &options).unwrap());
}

#[test]
fn browse_requires_browse_first() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    conn.put(APP_Q, &mut Message::with_data("a"), &PutParams::new()).unwrap();
    conn.put(APP_Q, &mut Message::with_data("b"), &PutParams::new()).unwrap();

    let mut queue = conn
        .open_queue(queue::Builder::new(APP_Q).mode(Mode::Browse))
        .unwrap();
    let mut message = Message::new();
    let err = queue
        .get(&mut message, &GetOptions::default().with(MQGMO_BROWSE_NEXT))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSequence(_)));
    let err = queue.get(&mut message, &GetOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidSequence(_)));

    assert!(queue
        .get(&mut message, &GetOptions::default().with(MQGMO_BROWSE_FIRST))
        .unwrap());
    assert_eq!(message.data, b"a");
    assert_eq!(queue.cursor(), Cursor::First);
    assert!(queue
        .get(&mut message, &GetOptions::default().with(MQGMO_BROWSE_NEXT))
        .unwrap());
    assert_eq!(message.data, b"b");
    assert_eq!(queue.cursor(), Cursor::Next);
    assert!(!queue
        .get(&mut message, &GetOptions::default().with(MQGMO_BROWSE_NEXT))
        .unwrap());

    // Browsing leaves the messages in place
    assert_eq!(qmgr.depth(APP_Q), Some(2));
}

#[test]
fn undecodable_message_still_moves_the_cursor() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut corrupt = Message::builder()
        .format(Format::DEAD_LETTER_HEADER)
        .data("not a header")
        .build();
    conn.put(APP_Q, &mut corrupt, &PutParams::new()).unwrap();
    conn.put(APP_Q, &mut Message::with_data("b"), &PutParams::new()).unwrap();

    let mut queue = conn
        .open_queue(queue::Builder::new(APP_Q).mode(Mode::Browse))
        .unwrap();
    let mut message = Message::new();
    let err = queue
        .get(&mut message, &GetOptions::default().with(MQGMO_BROWSE_FIRST))
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(queue.cursor(), Cursor::First);

    assert!(queue
        .get(&mut message, &GetOptions::default().with(MQGMO_BROWSE_NEXT))
        .unwrap());
    assert_eq!(message.data, b"b");
    assert_eq!(queue.cursor(), Cursor::Next);
}

#[test]
fn messages_iterator() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    for data in ["1", "2", "3"] {
        conn.put(APP_Q, &mut Message::with_data(data), &PutParams::new()).unwrap();
    }

    let mut browser = conn
        .open_queue(queue::Builder::new(APP_Q).mode(Mode::Browse))
        .unwrap();
    let browsed: Vec<Vec<u8>> = browser
        .messages(GetOptions::default())
        .map(|message| message.map(|message| message.data))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(browsed, vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
    assert_eq!(qmgr.depth(APP_Q), Some(3));

    let mut reader = conn.open_queue(input_output(APP_Q)).unwrap();
    assert_eq!(reader.messages(GetOptions::default()).count(), 3);
    assert_eq!(qmgr.depth(APP_Q), Some(0));
}

#[test]
fn backout_restores_messages() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut queue = conn.open_queue(input_output(APP_Q)).unwrap();
    queue.put(&mut Message::with_data("work"), &PutParams::new()).unwrap();

    let syncpoint = GetOptions::default().with(MQGMO_SYNCPOINT);
    let mut message = Message::new();
    assert!(queue.get(&mut message, &syncpoint).unwrap());
    assert_eq!(message.descriptor.backout_count, 0);
    assert!(!queue.get(&mut message, &GetOptions::default()).unwrap());

    conn.backout().unwrap();
    assert!(queue.get(&mut message, &syncpoint).unwrap());
    assert_eq!(message.data, b"work");
    assert_eq!(message.descriptor.backout_count, 1);

    conn.commit().unwrap();
    assert_eq!(qmgr.depth(APP_Q), Some(0));
}

#[test]
fn syncpoint_put_is_visible_after_commit() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut queue = conn.open_queue(input_output(APP_Q)).unwrap();
    queue
        .put(&mut Message::with_data("pending"), &PutParams::new().sync(true))
        .unwrap();

    let mut message = Message::new();
    assert!(!queue.get(&mut message, &GetOptions::default()).unwrap());
    conn.commit().unwrap();
    assert!(queue.get(&mut message, &GetOptions::default()).unwrap());
    assert_eq!(message.data, b"pending");
}

#[test]
fn model_queue_creates_dynamic_queue() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);

    let model = || {
        queue::Builder::new("SYSTEM.DEFAULT.MODEL.QUEUE")
            .mode(Mode::InputExclusive)
            .dynamic_q_name("APP.TEMP.*")
    };
    let mut queue = conn.open_queue(model()).unwrap();
    let dynamic = queue.name().to_string();
    assert!(dynamic.starts_with("APP.TEMP."));
    assert_ne!(dynamic, "SYSTEM.DEFAULT.MODEL.QUEUE");
    assert_eq!(qmgr.depth(&dynamic), Some(0));

    queue.close().unwrap();
    assert!(!queue.is_open());
    assert_eq!(qmgr.depth(&dynamic), None);
}

#[test]
fn existing_dynamic_queue_is_reopened() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    conn.mqsc("DEFINE QLOCAL(APP.REPLY)").unwrap();

    let model = queue::Builder::new("SYSTEM.DEFAULT.MODEL.QUEUE")
        .mode(Mode::InputExclusive)
        .dynamic_q_name("APP.REPLY");

    let err = conn.open_queue(model.clone()).unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::OBJECT_ALREADY_EXISTS));

    let queue = conn.open_queue(model.fail_if_exists(false)).unwrap();
    assert_eq!(queue.name(), "APP.REPLY");
    drop(queue);

    // The predefined queue survives the close
    assert_eq!(qmgr.depth("APP.REPLY"), Some(0));
}

#[test]
fn open_failures() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);

    let err = conn
        .open_queue(queue::Builder::new("MISSING.QUEUE").mode(Mode::Output))
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::UNKNOWN_OBJECT_NAME));

    let err = conn.open_queue(queue::Builder::new(APP_Q)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let _exclusive = conn
        .open_queue(queue::Builder::new(APP_Q).mode(Mode::InputExclusive))
        .unwrap();
    let err = conn
        .open_queue(queue::Builder::new(APP_Q).mode(Mode::InputShared))
        .unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::OBJECT_IN_USE));
}

#[test]
fn failures_follow_error_policy() {
    let qmgr = setup_queue_manager();
    qmgr.define(QueueDefinition::local("APP.LOCKED").inhibit_get(true))
        .unwrap();
    let conn = QueueManager::<&LocalQueueManager>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .exception_on_error(false)
        .connect(&qmgr)
        .unwrap();

    let mut queue = conn
        .open_queue(queue::Builder::new("APP.LOCKED").mode(Mode::Input))
        .unwrap();
    let mut message = Message::new();
    assert!(!queue.get(&mut message, &GetOptions::default()).unwrap());
    assert_eq!(queue.comp_code(), CompletionCode::Failed);
    assert_eq!(queue.reason_code(), ReasonCode::GET_INHIBITED);

    // Not opened for output
    assert!(!queue.put(&mut Message::with_data("x"), &PutParams::new()).unwrap());
    assert_eq!(queue.reason_code(), ReasonCode::NOT_OPEN_FOR_OUTPUT);

    // Inquiries always report failures as errors
    let err = queue.inquire(&[Selector::QName]).unwrap_err();
    assert_eq!(err.reason_code(), Some(ReasonCode::NOT_OPEN_FOR_INQUIRE));
}

#[test]
fn inquire_attributes_by_name() {
    let qmgr = setup_queue_manager();
    qmgr.define(
        QueueDefinition::local("APP.LIMITED")
            .max_depth(7)
            .description("Limited"),
    )
    .unwrap();
    let conn = connect(&qmgr);
    let mut queue = conn.open_queue(input_output("APP.LIMITED")).unwrap();

    let values = queue
        .inquire_names(&["max_q_depth", "q_desc", "q_type", "open_input_count"])
        .unwrap();
    assert_eq!(values["max_q_depth"], AttributeValue::Integer(7));
    assert_eq!(values["q_desc"], AttributeValue::String("Limited".into()));
    assert_eq!(values["q_type"], AttributeValue::Integer(MQQT_LOCAL));
    assert_eq!(values["open_input_count"], AttributeValue::Integer(1));

    let err = queue.inquire_names(&["no_such_attribute"]).unwrap_err();
    assert!(matches!(err, Error::UnknownName(_)));
}

#[test]
fn headers_survive_the_round_trip() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let mut queue = conn.open_queue(input_output(APP_Q)).unwrap();

    let rfh2 = Rfh2Header {
        folders: vec!["<usr><color>blue</color></usr>".to_string()],
        ..Default::default()
    };
    let mut message = Message::builder()
        .format(Format::STRING)
        .header(rfh2.clone())
        .data("payload")
        .build();
    queue.put(&mut message, &PutParams::new()).unwrap();
    assert_eq!(message.descriptor.format, Format::STRING);

    let mut received = Message::new();
    assert!(queue.get(&mut received, &GetOptions::default()).unwrap());
    assert_eq!(received.headers, vec![wmq_types::Header::Rfh2(rfh2)]);
    assert_eq!(received.descriptor.format, Format::STRING);
    assert_eq!(received.data, b"payload");
}

#[test]
fn queue_is_closed_on_drop() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    {
        let _queue = conn
            .open_queue(queue::Builder::new(APP_Q).mode(Mode::InputExclusive))
            .unwrap();
    }
    conn.open_queue(queue::Builder::new(APP_Q).mode(Mode::InputExclusive))
        .unwrap();
}

#[test]
fn scoped_queue_is_closed() {
    let qmgr = setup_queue_manager();
    let conn = connect(&qmgr);
    let result: Result<(), Error> =
        conn.open_queue_with(queue::Builder::new(APP_Q).mode(Mode::InputExclusive), |queue| {
            assert!(queue.is_open());
            Err(Error::NotOpen)
        });
    assert_eq!(result, Err(Error::NotOpen));
    conn.open_queue(queue::Builder::new(APP_Q).mode(Mode::InputExclusive))
        .unwrap();
}
