use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 外部词库提供的学习单词；调度逻辑只使用 id / text / meaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningItem {
    pub id: String,
    pub text: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl LearningItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            meaning: meaning.into(),
            pronunciation: None,
            part_of_speech: None,
            examples: Vec::new(),
        }
    }
}

/// 队列中的单词及其调度状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedEntry {
    pub word: LearningItem,
    /// 自上次答错（或入队）以来的连续答对次数
    pub correct_count: u32,
    /// 自上次答对（或入队）以来的连续答错次数
    pub error_count: u32,
    /// 最近一次作答时间（ms），从未作答为 0
    pub last_shown: i64,
    /// 越小越优先，保持服务端给出的相对顺序
    pub priority: u64,
}

impl QueuedEntry {
    pub fn new(word: LearningItem, priority: u64) -> Self {
        Self {
            word,
            correct_count: 0,
            error_count: 0,
            last_shown: 0,
            priority,
        }
    }

    pub fn id(&self) -> &str {
        &self.word.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerHistoryEntry {
    pub item_id: String,
    pub correct: bool,
    pub response_time_ms: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub mastered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueCounts {
    pub active: usize,
    pub mastered: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizMode {
    /// 看单词选释义
    WordToMeaning,
    /// 看释义选单词
    MeaningToWord,
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::WordToMeaning => "word-to-meaning",
            QuizMode::MeaningToWord => "meaning-to-word",
        }
    }

    /// 从单词中取出本模式下作为选项的字段
    pub fn answer_of<'a>(&self, word: &'a LearningItem) -> &'a str {
        match self {
            QuizMode::WordToMeaning => &word.meaning,
            QuizMode::MeaningToWord => &word.text,
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown quiz mode: {0}")]
pub struct UnknownQuizMode(pub String);

impl FromStr for QuizMode {
    type Err = UnknownQuizMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word-to-meaning" => Ok(QuizMode::WordToMeaning),
            "meaning-to-word" => Ok(QuizMode::MeaningToWord),
            other => Err(UnknownQuizMode(other.to_string())),
        }
    }
}

/// 一道四选一题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOptions {
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl QuizOptions {
    pub fn correct_answer(&self) -> &str {
        &self.options[self.correct_index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub overall_accuracy: f64,
    pub overall_avg_response_ms: f64,
    pub recent_accuracy: f64,
    pub recent_avg_response_ms: f64,
    pub total_answers: usize,
    pub recent_answers: usize,
}
