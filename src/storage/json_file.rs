use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::GradiatorConfig;
use crate::declare_storage_plugin;
use crate::errors::Result;
use crate::storage::KeyValueStore;

declare_storage_plugin!("json_file", JsonFileStore);

/// 文件持久化的键值存储
///
/// 整个键空间保存为磁盘上的单个 JSON 文档，构造时加载进内存，
/// 每次写入先写临时文件再原子重命名，避免写坏现有数据。
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    pub async fn new(config: &GradiatorConfig) -> Result<Self> {
        let path = PathBuf::from(&config.storage.path);
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    // 数据文件损坏时从空状态启动，不让整个应用拒绝服务
                    warn!("Data file {} is corrupt, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(
            "JsonFileStore initialized from {} with {} entries",
            path.display(),
            entries.len()
        );
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string(entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        // 在写锁内落盘，保证同进程的读后写一致性
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        self.persist(&entries).await
    }
}
