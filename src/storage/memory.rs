use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::GradiatorConfig;
use crate::declare_storage_plugin;
use crate::errors::Result;
use crate::storage::KeyValueStore;

declare_storage_plugin!("memory", MemoryStore);

/// 易失的内存键值存储
///
/// 用于测试，以及不需要跨进程持久化的场景。
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub async fn new(_config: &GradiatorConfig) -> Result<Self> {
        Ok(Self::default())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
