/// 默认每批加载单词数
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// 连续答对多少次视为掌握
pub const DEFAULT_MASTERY_THRESHOLD: u32 = 2;

/// 答题历史最大保留条数（超出后丢弃最旧记录）
pub const MAX_ANSWER_HISTORY: usize = 1000;

/// 近期指标统计窗口（最近 N 次答题）
pub const DEFAULT_RECENT_WINDOW: usize = 5;

/// 活跃队列剩余不超过此数量时触发预取
pub const DEFAULT_PREFETCH_THRESHOLD: usize = 2;

/// 每道选择题的干扰项数量
pub const DISTRACTOR_COUNT: usize = 3;

/// 持久化队列状态的默认键
pub const DEFAULT_STORAGE_KEY: &str = "learning_queue_state";

/// 当前持久化快照版本
pub const SNAPSHOT_VERSION: u32 = 2;

/// 干扰项不足时的占位文本
pub const PLACEHOLDER_MEANING: &str = "(no other meaning)";
pub const PLACEHOLDER_WORD: &str = "(no other word)";
