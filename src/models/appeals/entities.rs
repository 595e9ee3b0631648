use serde::{Deserialize, Serialize};

// 申诉状态（pending → reviewed，终态）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppealStatus {
    Pending,
    Reviewed,
}

/// 成绩申诉
///
/// 只存在于所属提交的内嵌字段中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appeal {
    // 唯一 ID
    pub id: String,
    // 所属提交 ID（反向引用）
    pub submission_id: String,
    // 申诉理由
    pub reason: String,
    // 申诉状态
    pub status: AppealStatus,
    // 发起时间
    pub created_at: String,
    // 复核时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
    // 被申诉成绩的快照
    pub original_grade: i32,
}
