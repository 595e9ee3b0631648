use serde::{Deserialize, Serialize};

/// 科目
///
/// 持久化 JSON 采用 camelCase 字段名，与前端存储的历史数据保持一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    // 唯一 ID（空字符串表示尚未分配，由存储层生成）
    #[serde(default)]
    pub id: String,
    // 科目名称
    pub title: String,
    // 科目描述
    pub description: String,
    // 科目代码，如 CS101
    pub code: String,
    // 封面图片引用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
