use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GradiatorConfig {
    pub app: AppSettings,
    pub remote: RemoteConfig,
    pub storage: StorageConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 远程评分服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,        // 远程服务基础 URL
    pub probe_timeout: u64,      // 可达性探测超时 (秒)
    pub request_timeout: u64,    // 单次请求超时 (秒)
}

/// 本地存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub backend: String,         // 存储后端插件名（json_file / memory）
    pub path: String,            // json_file 后端的数据文件路径
    pub key_prefix: String,      // 键命名空间前缀，避免与同一存储中的无关数据冲突
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            system_name: "Gradiator".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            probe_timeout: 3,
            request_timeout: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "json_file".to_string(),
            path: "gradiator_data.json".to_string(),
            key_prefix: "gradiator_".to_string(),
        }
    }
}
