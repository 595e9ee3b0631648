use serde::{Deserialize, Serialize};

/// 新建提交请求（ID 由存储层分配）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub student_id: String,
    pub student_name: String,
    pub files: Vec<String>,
    pub submitted_at: String,
}

/// 评分请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSubmissionRequest {
    pub grade: i32,
    pub feedback: String,
}

/// 申诉请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppealRequest {
    pub reason: String,
}

/// 申诉复核请求（覆盖原成绩并关闭申诉）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAppealRequest {
    pub grade: i32,
    pub feedback: String,
}
