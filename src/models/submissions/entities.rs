use serde::{Deserialize, Serialize};

use crate::models::appeals::entities::Appeal;

// 提交状态
//
// 不变式：status 为 graded 当且仅当 grade 存在。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Submitted => write!(f, "submitted"),
            SubmissionStatus::Graded => write!(f, "graded"),
        }
    }
}

/// 作业提交
///
/// 只存在于所属作业的内嵌集合中，没有独立的持久化键。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    // 唯一 ID
    pub id: String,
    // 所属作业 ID（反向引用）
    pub assignment_id: String,
    // 提交学生 ID
    pub student_id: String,
    // 提交学生姓名
    pub student_name: String,
    // 提交的文件引用列表
    pub files: Vec<String>,
    // 提交时间
    pub submitted_at: String,
    // 提交状态
    pub status: SubmissionStatus,
    // 得分（0-100）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<i32>,
    // 评语
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    // 内嵌的成绩申诉
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appeal: Option<Appeal>,
}

impl Submission {
    /// 是否允许对该提交发起申诉：必须已有非零成绩
    pub fn appealable(&self) -> bool {
        matches!(self.grade, Some(g) if g > 0)
    }
}
