//! 队列状态的持久化快照：每次变更后写入外部存储，构造时读回。
//!
//! 快照格式（version 2）：
//! `{ "version": 2, "active": [...], "mastered": [...], "batchSize": n }`
//!
//! 旧版本数据可能缺少 `version`、`priority`、计数字段或 `batchSize`，
//! 读回时按数组下标回填 `priority`，其余字段取默认值。
//! 无法解析的数据一律视为空队列，不向调用方报错。

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::SNAPSHOT_VERSION;
use crate::queue::types::{LearningItem, QueuedEntry};
use crate::store::{KeyValueStore, StoreError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    version: u32,
    active: &'a [QueuedEntry],
    mastered: &'a [QueuedEntry],
    batch_size: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    active: Vec<Value>,
    #[serde(default)]
    mastered: Vec<Value>,
    #[serde(default)]
    batch_size: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    word: LearningItem,
    #[serde(default)]
    correct_count: u32,
    #[serde(default)]
    error_count: u32,
    #[serde(default)]
    last_shown: i64,
    #[serde(default)]
    priority: Option<u64>,
}

/// 从存储恢复出的队列内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoredQueue {
    pub active: Vec<QueuedEntry>,
    pub mastered: Vec<QueuedEntry>,
    pub batch_size: Option<usize>,
}

pub fn encode_snapshot(
    active: &[QueuedEntry],
    mastered: &[QueuedEntry],
    batch_size: usize,
) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(SnapshotRef {
        version: SNAPSHOT_VERSION,
        active,
        mastered,
        batch_size,
    })?)
}

fn decode_entries(raw: Vec<Value>, list: &'static str) -> Vec<QueuedEntry> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<RawEntry>(value) {
            Ok(entry) => Some(QueuedEntry {
                word: entry.word,
                correct_count: entry.correct_count,
                error_count: entry.error_count,
                last_shown: entry.last_shown,
                priority: entry.priority.unwrap_or(index as u64),
            }),
            Err(e) => {
                tracing::warn!(list, index, error = %e, "Dropping malformed queue entry");
                None
            }
        })
        .collect()
}

/// 解析快照并修复违反队列不变量的数据。
///
/// - 同一 id 只保留首次出现（先扫描 active，再扫描 mastered）
/// - 连对与连错计数同时非零时清零连对计数
/// - active 中已达到掌握阈值的条目移入 mastered
pub fn decode_snapshot(value: Value, mastery_threshold: u32) -> RestoredQueue {
    let raw: RawSnapshot = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed queue snapshot, starting empty");
            return RestoredQueue::default();
        }
    };

    if raw.version.unwrap_or(1) > SNAPSHOT_VERSION {
        tracing::warn!(
            version = raw.version,
            supported = SNAPSHOT_VERSION,
            "Queue snapshot from newer version, reading known fields only"
        );
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut active = Vec::new();
    let mut mastered = Vec::new();

    for mut entry in decode_entries(raw.active, "active") {
        if !seen.insert(entry.word.id.clone()) {
            continue;
        }
        if entry.correct_count > 0 && entry.error_count > 0 {
            entry.correct_count = 0;
        }
        if entry.correct_count >= mastery_threshold {
            mastered.push(entry);
        } else {
            active.push(entry);
        }
    }

    for mut entry in decode_entries(raw.mastered, "mastered") {
        if !seen.insert(entry.word.id.clone()) {
            continue;
        }
        if entry.correct_count > 0 && entry.error_count > 0 {
            entry.correct_count = 0;
        }
        mastered.push(entry);
    }

    RestoredQueue {
        active,
        mastered,
        batch_size: raw.batch_size.filter(|size| *size > 0),
    }
}

/// 持久化适配器：存储失败只记录日志，内存状态始终为准
#[derive(Clone)]
pub struct QueuePersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl QueuePersistence {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, active: &[QueuedEntry], mastered: &[QueuedEntry], batch_size: usize) {
        let result =
            encode_snapshot(active, mastered, batch_size).and_then(|v| self.store.set(&self.key, &v));
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist queue state");
        }
    }

    pub fn restore(&self, mastery_threshold: u32) -> RestoredQueue {
        match self.store.get_or(&self.key, Value::Null) {
            Value::Null => RestoredQueue::default(),
            value => decode_snapshot(value, mastery_threshold),
        }
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.store.flush()
    }

    pub fn purge(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "Failed to purge queue state");
        }
    }
}
