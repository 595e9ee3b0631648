//! 本地键值存储层
//!
//! 提供持久化键值存储的统一抽象：`KeyValueStore` 为原始后端接口，
//! `JsonStore` 在其上叠加 JSON 编解码与键命名空间前缀。
//! 后端以插件形式注册（json_file / memory），由配置选择。

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::GradiatorConfig;
use crate::errors::{GradiatorError, Result};

pub mod json_file;
pub mod memory;
pub mod register;

/// 原始键值存储后端接口
///
/// 读写的值为已编码的 JSON 文本，编解码由 `JsonStore` 负责。
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    // 读取原始值，键不存在时返回 None
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;
    // 写入原始值，写入被拒绝时返回 StorageFailure
    async fn set_raw(&self, key: &str, value: String) -> Result<()>;
}

/// 声明存储后端插件
///
/// 在模块加载时将构造函数注册到全局插件表，
/// 与缓存插件的注册方式一致。
#[macro_export]
macro_rules! declare_storage_plugin {
    ($name:literal, $ty:ident) => {
        paste::paste! {
            #[ctor::ctor]
            fn [<__register_storage_plugin_ $ty:snake>]() {
                $crate::storage::register::register_storage_plugin(
                    $name,
                    std::sync::Arc::new(|config: $crate::config::GradiatorConfig| {
                        Box::pin(async move {
                            let store = $ty::new(&config).await?;
                            Ok(Box::new(store) as Box<dyn $crate::storage::KeyValueStore>)
                        })
                    }),
                );
            }
        }
    };
}

/// 根据配置创建键值存储后端
pub async fn create_key_value_store(config: &GradiatorConfig) -> Result<Arc<dyn KeyValueStore>> {
    let name = config.storage.backend.as_str();
    let constructor = register::get_storage_plugin(name).ok_or_else(|| {
        GradiatorError::storage_plugin_not_found(format!("Unknown storage backend: {name}"))
    })?;
    let store = constructor(config.clone()).await?;
    Ok(Arc::from(store))
}

/// 带命名空间前缀的 JSON 键值存储
///
/// 读路径永不失败：键缺失或 JSON 损坏时记录日志并返回调用方提供的默认值。
/// 写路径的失败（如配额耗尽）原样传播给调用方。
#[derive(Clone)]
pub struct JsonStore {
    inner: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl JsonStore {
    pub fn new(inner: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.inner.get_raw(&self.full_key(key)).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Corrupt JSON for key {}, returning default: {}", key, e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                warn!("Failed to read key {}, returning default: {}", key, e);
                default
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.inner.set_raw(&self.full_key(key), raw).await
    }
}
