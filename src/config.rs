use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MASTERY_THRESHOLD, DEFAULT_PREFETCH_THRESHOLD,
    DEFAULT_RECENT_WINDOW, DEFAULT_STORAGE_KEY, MAX_ANSWER_HISTORY,
};
use crate::store::keys::queue_state_key;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub queue: QueueConfig,
}

/// 学习队列的调度参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    pub storage_key: String,
    pub batch_size: usize,
    pub mastery_threshold: u32,
    pub max_answer_history: usize,
    pub recent_window: usize,
    pub prefetch_threshold: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
            max_answer_history: MAX_ANSWER_HISTORY,
            recent_window: DEFAULT_RECENT_WINDOW,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
        }
    }
}

impl QueueConfig {
    /// 同一存储中为不同学习者隔离队列状态
    pub fn for_learner(&self, learner_id: &str) -> Self {
        Self {
            storage_key: queue_state_key(&self.storage_key, learner_id),
            ..self.clone()
        }
    }

    pub fn from_env() -> Self {
        Self {
            storage_key: env_or("QUEUE_STORAGE_KEY", DEFAULT_STORAGE_KEY),
            batch_size: env_or_parse("QUEUE_BATCH_SIZE", DEFAULT_BATCH_SIZE),
            mastery_threshold: env_or_parse("QUEUE_MASTERY_THRESHOLD", DEFAULT_MASTERY_THRESHOLD)
                .max(1),
            max_answer_history: env_or_parse("QUEUE_MAX_ANSWER_HISTORY", MAX_ANSWER_HISTORY)
                .max(1),
            recent_window: env_or_parse("QUEUE_RECENT_WINDOW", DEFAULT_RECENT_WINDOW).max(1),
            prefetch_threshold: env_or_parse(
                "QUEUE_PREFETCH_THRESHOLD",
                DEFAULT_PREFETCH_THRESHOLD,
            ),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/learning-queue.sled"),
            queue: QueueConfig::from_env(),
        }
    }

    /// 先加载 `.env`（不存在时忽略），再读取环境变量
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
