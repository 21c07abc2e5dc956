pub mod keys;
pub mod memory;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sled::Db;
use thiserror::Error;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// 以字符串为键、JSON 为值的外部存储。
///
/// 队列只通过 get / set / remove 使用它，不关心底层介质。
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// 把已写入的数据落盘；内存实现无需操作
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// 读取失败或键不存在时返回 `fallback`
    fn get_or(&self, key: &str, fallback: Value) -> Value {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!(key, error = %e, "Store read failed, using fallback");
                fallback
            }
        }
    }
}

#[derive(Debug)]
pub struct SledStore {
    db: Db,
    pub queue_state: sled::Tree,
}

impl SledStore {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let queue_state = db.open_tree(trees::QUEUE_STATE)?;
        Ok(Self { db, queue_state })
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self.queue_state.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.queue_state
            .insert(key.as_bytes(), Self::serialize(value)?)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.queue_state.remove(key.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}
