//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_gradiator_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum GradiatorError {
            $($variant(String),)*
        }

        impl GradiatorError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(GradiatorError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(GradiatorError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(GradiatorError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl GradiatorError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        GradiatorError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_gradiator_errors! {
    RemoteUnreachable("E001", "Remote Unreachable"),
    NotFound("E002", "Resource Not Found"),
    InvalidState("E003", "Invalid State"),
    StorageFailure("E004", "Storage Failure"),
    Validation("E005", "Validation Error"),
    Serialization("E006", "Serialization Error"),
    StoragePluginNotFound("E007", "Storage Plugin Not Found"),
    FileOperation("E008", "File Operation Error"),
    Configuration("E009", "Configuration Error"),
    DateParse("E010", "Date Parse Error"),
}

impl GradiatorError {
    /// 远程失败是否应触发本地降级（见协调器的降级策略）
    pub fn is_unreachable(&self) -> bool {
        matches!(self, GradiatorError::RemoteUnreachable(_))
    }

    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GradiatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GradiatorError {}

// 为常见的错误类型实现 From trait
impl From<reqwest::Error> for GradiatorError {
    fn from(err: reqwest::Error) -> Self {
        GradiatorError::RemoteUnreachable(err.to_string())
    }
}

impl From<std::io::Error> for GradiatorError {
    fn from(err: std::io::Error) -> Self {
        GradiatorError::StorageFailure(err.to_string())
    }
}

impl From<serde_json::Error> for GradiatorError {
    fn from(err: serde_json::Error) -> Self {
        GradiatorError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for GradiatorError {
    fn from(err: chrono::ParseError) -> Self {
        GradiatorError::DateParse(err.to_string())
    }
}

impl From<config::ConfigError> for GradiatorError {
    fn from(err: config::ConfigError) -> Self {
        GradiatorError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GradiatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GradiatorError::remote_unreachable("test").code(), "E001");
        assert_eq!(GradiatorError::not_found("test").code(), "E002");
        assert_eq!(GradiatorError::invalid_state("test").code(), "E003");
        assert_eq!(GradiatorError::storage_failure("test").code(), "E004");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            GradiatorError::remote_unreachable("test").error_type(),
            "Remote Unreachable"
        );
        assert_eq!(
            GradiatorError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = GradiatorError::invalid_state("Submission has no grade");
        assert_eq!(err.message(), "Submission has no grade");
    }

    #[test]
    fn test_is_unreachable() {
        assert!(GradiatorError::remote_unreachable("probe failed").is_unreachable());
        assert!(!GradiatorError::not_found("missing").is_unreachable());
    }

    #[test]
    fn test_format_simple() {
        let err = GradiatorError::not_found("Assignment 42 not found");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Not Found"));
        assert!(formatted.contains("Assignment 42"));
    }
}
