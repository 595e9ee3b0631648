use serde::{Deserialize, Serialize};

/// AI 评分结果
///
/// 远程评分服务 `/api/grade` 的响应体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiGradeResult {
    // 得分（0-100）
    pub score: i32,
    // 评语
    pub feedback: String,
}
