//! 自适应学习队列：维护未掌握 / 已掌握两个有序集合，决定下一个展示的单词，
//! 并记录本次学习的答题表现。
//!
//! 所有操作同步完成；每次变更后写入持久化快照并广播最新计数。

pub mod analytics;
pub mod persistence;
pub mod selection;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, QueueConfig};
use crate::logging::{init_tracing, LogConfig};
use crate::queue::analytics::AnswerHistory;
use crate::queue::persistence::QueuePersistence;
use crate::queue::types::{AnswerHistoryEntry, AnswerOutcome, LearningItem, QueueCounts, QueuedEntry};
use crate::store::{KeyValueStore, SledStore, StoreError};

const COUNTS_CHANNEL_CAPACITY: usize = 64;

pub struct LearningQueue {
    config: QueueConfig,
    clock: Arc<dyn Clock>,
    persistence: QueuePersistence,
    active: Vec<QueuedEntry>,
    mastered: Vec<QueuedEntry>,
    batch_size: usize,
    target_mastery_count: Option<usize>,
    history: AnswerHistory,
    counts_tx: broadcast::Sender<QueueCounts>,
}

impl LearningQueue {
    /// 创建队列并从存储中恢复上次的状态
    pub fn open(store: Arc<dyn KeyValueStore>, config: QueueConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// 按进程配置组装：初始化日志，打开 `sled_path` 处的数据库，再恢复队列
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        init_tracing(&LogConfig::from(config));
        let store = Arc::new(SledStore::open(&config.sled_path)?);
        tracing::info!(sled_path = %config.sled_path, "Opened queue store");
        Ok(Self::open(store, config.queue.clone()))
    }

    /// 读取 `.env` 与环境变量后调用 [`from_config`](Self::from_config)
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_config(&Config::load())
    }

    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        mut config: QueueConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        config.mastery_threshold = config.mastery_threshold.max(1);
        let persistence = QueuePersistence::new(store, config.storage_key.clone());
        let restored = persistence.restore(config.mastery_threshold);
        let (counts_tx, _) = broadcast::channel(COUNTS_CHANNEL_CAPACITY);

        tracing::debug!(
            key = %persistence.key(),
            active = restored.active.len(),
            mastered = restored.mastered.len(),
            "Learning queue restored"
        );

        Self {
            batch_size: restored.batch_size.unwrap_or(config.batch_size),
            history: AnswerHistory::new(config.max_answer_history),
            active: restored.active,
            mastered: restored.mastered,
            target_mastery_count: None,
            clock,
            persistence,
            config,
            counts_tx,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn active(&self) -> &[QueuedEntry] {
        &self.active
    }

    pub fn mastered(&self) -> &[QueuedEntry] {
        &self.mastered
    }

    pub fn entry(&self, item_id: &str) -> Option<&QueuedEntry> {
        self.active
            .iter()
            .chain(self.mastered.iter())
            .find(|entry| entry.word.id == item_id)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn target_mastery_count(&self) -> Option<usize> {
        self.target_mastery_count
    }

    pub fn is_target_reached(&self) -> bool {
        self.target_mastery_count
            .is_some_and(|target| self.mastered.len() >= target)
    }

    pub fn counts(&self) -> QueueCounts {
        QueueCounts {
            active: self.active.len(),
            mastered: self.mastered.len(),
        }
    }

    /// 订阅计数变化；每次变更操作后推送一次
    pub fn subscribe(&self) -> broadcast::Receiver<QueueCounts> {
        self.counts_tx.subscribe()
    }

    /// 首批加载，语义与 [`add_words`](Self::add_words) 相同
    pub fn load_words(&mut self, items: Vec<LearningItem>) -> usize {
        self.merge_words(items, "load")
    }

    pub fn add_words(&mut self, items: Vec<LearningItem>) -> usize {
        self.merge_words(items, "append")
    }

    /// 合并新词：已在队列中的 id 跳过；新词的 priority 接着当前最大值递增，
    /// 保持服务端给出的相对顺序。返回实际新增数量。
    fn merge_words(&mut self, items: Vec<LearningItem>, source: &'static str) -> usize {
        let mut known: HashSet<String> = self
            .active
            .iter()
            .chain(self.mastered.iter())
            .map(|entry| entry.word.id.clone())
            .collect();
        let mut next_priority = self
            .active
            .iter()
            .map(|entry| entry.priority)
            .max()
            .map_or(0, |max| max.saturating_add(1));

        let offered = items.len();
        let mut added = 0usize;
        for item in items {
            if !known.insert(item.id.clone()) {
                continue;
            }
            self.active.push(QueuedEntry::new(item, next_priority));
            next_priority = next_priority.saturating_add(1);
            added += 1;
        }

        tracing::debug!(
            source,
            offered,
            added,
            active = self.active.len(),
            "Merged words into queue"
        );
        self.persist();
        self.notify();
        added
    }

    /// 记录一次作答。id 不在活跃队列中时不做任何事。
    pub fn record_answer(
        &mut self,
        item_id: &str,
        correct: bool,
        response_time_ms: Option<u64>,
    ) -> AnswerOutcome {
        let Some(index) = self.active.iter().position(|entry| entry.word.id == item_id) else {
            tracing::debug!(word_id = item_id, "Answer for unknown or mastered word ignored");
            return AnswerOutcome { mastered: false };
        };

        let now_ms = self.clock.now_ms();
        let threshold = self.config.mastery_threshold;
        let entry = &mut self.active[index];
        entry.last_shown = now_ms;
        if correct {
            entry.correct_count = entry.correct_count.saturating_add(1);
            entry.error_count = 0;
        } else {
            entry.correct_count = 0;
            entry.error_count = entry.error_count.saturating_add(1);
        }
        let reached = correct && entry.correct_count >= threshold;

        if let Some(response_time_ms) = response_time_ms {
            self.history.push(AnswerHistoryEntry {
                item_id: item_id.to_string(),
                correct,
                response_time_ms,
                timestamp: now_ms,
            });
        }

        if reached {
            let entry = self.active.remove(index);
            tracing::info!(
                word_id = %entry.word.id,
                mastered = self.mastered.len() + 1,
                "Word mastered"
            );
            self.mastered.push(entry);
        } else {
            tracing::debug!(word_id = item_id, correct, "Answer recorded");
        }

        self.persist();
        self.notify();
        AnswerOutcome { mastered: reached }
    }

    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch_size = batch_size.max(1);
        self.persist();
        self.notify();
    }

    pub fn set_target_mastery_count(&mut self, target: Option<usize>) {
        self.target_mastery_count = target;
    }

    /// 开始全新的学习：清空两个队列、答题日志与掌握目标，并删除持久化状态
    pub fn reset(&mut self) {
        self.active.clear();
        self.mastered.clear();
        self.history.clear();
        self.target_mastery_count = None;
        self.persistence.purge();
        tracing::info!(key = %self.persistence.key(), "Learning queue reset");
        self.notify();
    }

    /// 强制把最近一次快照写入磁盘
    pub fn flush(&self) -> Result<(), StoreError> {
        self.persistence.flush()
    }

    pub fn get_all_word_ids(&self) -> Vec<String> {
        self.active
            .iter()
            .chain(self.mastered.iter())
            .map(|entry| entry.word.id.clone())
            .collect()
    }

    pub fn get_mastered_word_ids(&self) -> Vec<String> {
        self.mastered
            .iter()
            .map(|entry| entry.word.id.clone())
            .collect()
    }

    fn persist(&self) {
        self.persistence
            .save(&self.active, &self.mastered, self.batch_size);
    }

    fn notify(&self) {
        // 没有订阅者时 send 返回 Err，属于正常情况
        let _ = self.counts_tx.send(self.counts());
    }
}
