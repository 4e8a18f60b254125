#![allow(dead_code)]

use wmq::{
    local::{LocalQueueManager, QueueDefinition},
    QueueManager,
};

pub const Q_MGR_NAME: &str = "QM1";
pub const APP_Q: &str = "APP.QUEUE";
pub const REPLY_Q: &str = "R";

/// A queue manager with the application and reply queues defined
pub fn setup_queue_manager() -> LocalQueueManager {
    let qmgr = LocalQueueManager::new(Q_MGR_NAME);
    qmgr.define(QueueDefinition::local(APP_Q)).unwrap();
    qmgr.define(QueueDefinition::local(REPLY_Q)).unwrap();
    qmgr
}

pub fn connect(qmgr: &LocalQueueManager) -> QueueManager<&LocalQueueManager> {
    QueueManager::<&LocalQueueManager>::builder()
        .q_mgr_name(Q_MGR_NAME)
        .connect(qmgr)
        .unwrap()
}
