use std::collections::VecDeque;

use crate::queue::types::{AnswerHistoryEntry, SessionMetrics};
use crate::queue::LearningQueue;

/// 有界答题日志，超出容量时丢弃最旧记录
#[derive(Debug, Clone)]
pub struct AnswerHistory {
    entries: VecDeque<AnswerHistoryEntry>,
    capacity: usize,
}

impl AnswerHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, entry: AnswerHistoryEntry) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 从最旧到最新
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &AnswerHistoryEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn metrics(&self, recent_window: usize) -> SessionMetrics {
        let (overall_accuracy, overall_avg_response_ms) = summarize(self.entries.iter());
        let recent_answers = recent_window.min(self.entries.len());
        let (recent_accuracy, recent_avg_response_ms) =
            summarize(self.entries.iter().skip(self.entries.len() - recent_answers));

        SessionMetrics {
            overall_accuracy,
            overall_avg_response_ms,
            recent_accuracy,
            recent_avg_response_ms,
            total_answers: self.entries.len(),
            recent_answers,
        }
    }
}

/// (正确率, 平均响应时间)；空输入返回 (0, 0)
fn summarize<'a>(entries: impl Iterator<Item = &'a AnswerHistoryEntry>) -> (f64, f64) {
    let mut total = 0usize;
    let mut correct = 0usize;
    let mut response_sum = 0f64;
    for entry in entries {
        total += 1;
        if entry.correct {
            correct += 1;
        }
        response_sum += entry.response_time_ms as f64;
    }
    if total == 0 {
        return (0.0, 0.0);
    }
    (correct as f64 / total as f64, response_sum / total as f64)
}

impl LearningQueue {
    pub fn compute_session_metrics(&self) -> SessionMetrics {
        self.history.metrics(self.config.recent_window)
    }

    /// 当前连错计数大于 0 的单词 id（active 与 mastered 都会检查），
    /// 供调用方向远端拉词时优先包含易错词
    pub fn get_error_prone_word_ids(&self) -> Vec<String> {
        self.active
            .iter()
            .chain(self.mastered.iter())
            .filter(|entry| entry.error_count > 0)
            .map(|entry| entry.word.id.clone())
            .collect()
    }

    pub fn history(&self) -> &AnswerHistory {
        &self.history
    }

    /// 只清空答题日志，队列内容保持不变
    pub fn reset_history(&mut self) {
        self.history.clear();
        tracing::debug!("Answer history cleared");
    }
}
