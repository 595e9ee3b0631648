use serde::{Deserialize, Serialize};

use crate::models::submissions::entities::{Submission, SubmissionStatus};

// 作业类型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    Homework, // 课后作业
    Exam,     // 考试
    Quiz,     // 小测
}

impl std::fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentType::Homework => write!(f, "homework"),
            AssignmentType::Exam => write!(f, "exam"),
            AssignmentType::Quiz => write!(f, "quiz"),
        }
    }
}

// 作业聚合状态
//
// 由提交集合派生：全部已评分为 graded，存在未评分提交为 submitted，
// 无提交时保持 upcoming。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Upcoming,
    Submitted,
    Graded,
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Upcoming => write!(f, "upcoming"),
            AssignmentStatus::Submitted => write!(f, "submitted"),
            AssignmentStatus::Graded => write!(f, "graded"),
        }
    }
}

/// 作业
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    // 唯一 ID（空字符串表示尚未分配，由存储层生成）
    #[serde(default)]
    pub id: String,
    // 作业标题
    pub title: String,
    // 所属科目 ID
    pub subject_id: String,
    // 作业描述
    pub description: String,
    // 截止日期（YYYY-MM-DD）
    pub due_date: String,
    // 作业类型
    #[serde(rename = "type")]
    pub kind: AssignmentType,
    // 聚合状态
    pub status: AssignmentStatus,
    // 满分
    pub max_grade: i32,
    // 评分标准
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
    // 申诉截止日期，创建时派生为截止日期后 5 天
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appeal_deadline: Option<String>,
    // 是否存在待处理申诉（由提交集合派生）
    #[serde(default)]
    pub has_appeal: bool,
    // 内嵌的提交集合，插入顺序即提交顺序
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

impl Assignment {
    /// 由提交集合派生聚合状态
    ///
    /// 没有提交时返回 None，调用方保持现有状态不变。
    pub fn derived_status(&self) -> Option<AssignmentStatus> {
        if self.submissions.is_empty() {
            return None;
        }
        if self
            .submissions
            .iter()
            .all(|s| s.status == SubmissionStatus::Graded)
        {
            Some(AssignmentStatus::Graded)
        } else {
            Some(AssignmentStatus::Submitted)
        }
    }

    /// 是否存在状态为 pending 的申诉
    pub fn derived_has_appeal(&self) -> bool {
        self.submissions.iter().any(|s| {
            s.appeal
                .as_ref()
                .is_some_and(|a| a.status == crate::models::appeals::entities::AppealStatus::Pending)
        })
    }

    /// 应用派生字段（聚合状态 + 申诉标记）
    pub fn refresh_derived(&mut self) {
        if let Some(status) = self.derived_status() {
            self.status = status;
        }
        self.has_appeal = self.derived_has_appeal();
    }
}
