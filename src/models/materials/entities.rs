use serde::{Deserialize, Serialize};

// 课程材料类型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Document,     // 文档
    Video,        // 视频
    Presentation, // 演示文稿
    Other,        // 其他
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialType::Document => write!(f, "document"),
            MaterialType::Video => write!(f, "video"),
            MaterialType::Presentation => write!(f, "presentation"),
            MaterialType::Other => write!(f, "other"),
        }
    }
}

/// 课程材料
///
/// 由评分者创建，对学生只读。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    // 唯一 ID（空字符串表示尚未分配，由存储层生成）
    #[serde(default)]
    pub id: String,
    // 材料标题
    pub title: String,
    // 所属科目 ID
    pub subject_id: String,
    // 材料描述
    pub description: String,
    // 材料类型
    #[serde(rename = "type")]
    pub kind: MaterialType,
    // 文件引用
    pub file_url: String,
    // 添加日期
    pub date_added: String,
}
