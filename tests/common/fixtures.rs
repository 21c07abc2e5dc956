use std::sync::Arc;

use learning_queue::clock::ManualClock;
use learning_queue::config::QueueConfig;
use learning_queue::queue::types::LearningItem;
use learning_queue::store::{KeyValueStore, MemoryStore};
use learning_queue::LearningQueue;

pub const START_MS: i64 = 1_700_000_000_000;

pub fn item(id: &str) -> LearningItem {
    LearningItem::new(id, format!("text-{id}"), format!("meaning-{id}"))
}

pub fn items(count: usize) -> Vec<LearningItem> {
    (0..count).map(|idx| item(&format!("w{idx}"))).collect()
}

pub struct TestQueue {
    pub queue: LearningQueue,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

pub fn queue_with(config: QueueConfig) -> TestQueue {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(START_MS));
    let queue = LearningQueue::with_clock(store.clone(), config, clock.clone());
    TestQueue {
        queue,
        store,
        clock,
    }
}

pub fn queue() -> TestQueue {
    queue_with(QueueConfig::default())
}

pub fn reopen(store: Arc<dyn KeyValueStore>, config: QueueConfig) -> LearningQueue {
    LearningQueue::with_clock(store, config, Arc::new(ManualClock::new(START_MS)))
}
