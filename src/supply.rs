//! 外部词库接口：按服务端顺序返回一批候选单词

use std::collections::HashSet;

use thiserror::Error;

use crate::queue::types::LearningItem;
use crate::queue::LearningQueue;

#[derive(Debug, Error)]
pub enum SupplyError {
    #[error("word supply unavailable: {0}")]
    Unavailable(String),
    #[error("invalid word batch: {0}")]
    InvalidBatch(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub limit: usize,
    /// 队列中已有的 id，服务端不应再返回
    pub exclude_ids: Vec<String>,
    /// 易错词 id，服务端可据此调整出题倾向
    pub error_prone_ids: Vec<String>,
}

pub trait WordSupply {
    /// 返回的顺序即优先级顺序
    fn fetch_batch(&self, request: &FetchRequest) -> Result<Vec<LearningItem>, SupplyError>;
}

/// 固定词表，按给定顺序供词
#[derive(Debug, Clone, Default)]
pub struct StaticWordSupply {
    catalogue: Vec<LearningItem>,
}

impl StaticWordSupply {
    pub fn new(catalogue: Vec<LearningItem>) -> Self {
        Self { catalogue }
    }
}

impl WordSupply for StaticWordSupply {
    fn fetch_batch(&self, request: &FetchRequest) -> Result<Vec<LearningItem>, SupplyError> {
        let excluded: HashSet<&str> = request.exclude_ids.iter().map(String::as_str).collect();
        Ok(self
            .catalogue
            .iter()
            .filter(|item| !excluded.contains(item.id.as_str()))
            .take(request.limit)
            .cloned()
            .collect())
    }
}

impl LearningQueue {
    /// 队列不足或即将耗尽时向词库补词，返回新增数量。
    ///
    /// 词库出错或返回超过请求数量的单词时返回错误，队列保持不变。
    pub fn top_up(&mut self, supply: &dyn WordSupply) -> Result<usize, SupplyError> {
        if !self.needs_more_words() && !self.should_prefetch() {
            return Ok(0);
        }

        let request = FetchRequest {
            limit: self.batch_size().saturating_sub(self.active().len()).max(1),
            exclude_ids: self.get_all_word_ids(),
            error_prone_ids: self.get_error_prone_word_ids(),
        };
        let items = supply.fetch_batch(&request)?;
        if items.len() > request.limit {
            return Err(SupplyError::InvalidBatch(format!(
                "requested at most {} words, got {}",
                request.limit,
                items.len()
            )));
        }
        if items.is_empty() {
            tracing::debug!(limit = request.limit, "Word supply returned no new words");
            return Ok(0);
        }
        Ok(self.add_words(items))
    }
}
