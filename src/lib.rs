//! Gradiator - 学业作业追踪数据核心
//!
//! 远程优先、本地兜底的作业与评分数据层：启动时探测远程评分
//! 服务，可达则所有操作走 HTTP，不可达（或会话中途失败）则
//! 降级到本地 JSON 键值存储，并保持相同的变更语义。
//!
//! # 架构
//! - `config`: 配置管理
//! - `context`: 领域上下文（快照缓存与派生查询）
//! - `coordinator`: 持久化协调器（远程/本地切换与本地变更语义）
//! - `data`: 首次启动的示例数据
//! - `errors`: 统一错误处理
//! - `gateway`: 远程 HTTP 网关
//! - `models`: 数据模型定义
//! - `storage`: 键值存储层（插件注册与 JSON 命名空间）

pub mod config;
pub mod context;
pub mod coordinator;
pub mod data;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod storage;
