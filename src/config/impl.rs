use config::{Config, ConfigError, Environment, File};
use std::time::Duration;

use super::GradiatorConfig;

impl GradiatorConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("GRADIATOR")
                    .separator("_")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("remote.base_url", std::env::var("API_URL").ok())?
            .set_override_option("remote.probe_timeout", std::env::var("PROBE_TIMEOUT").ok())?
            .set_override_option("storage.type", std::env::var("STORAGE_BACKEND").ok())?
            .set_override_option("storage.path", std::env::var("STORAGE_PATH").ok())?;

        let config = builder.build()?;
        let app_config: GradiatorConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 可达性探测超时时长
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.probe_timeout)
    }

    /// 单次远程请求超时时长
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.request_timeout)
    }
}
