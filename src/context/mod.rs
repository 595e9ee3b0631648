//! 领域上下文
//!
//! 缓存最近一次成功拉取的科目、作业与材料快照，向上层暴露
//! 同步的派生查询和异步的变更入口。每次变更成功后整体刷新
//! 三个集合，保证缓存始终与当前生效的后端一致；变更失败时
//! 缓存保持原样，并把错误转换为一条用户可见的通知。

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error};

use crate::coordinator::PersistenceCoordinator;
use crate::errors::{GradiatorError, Result};
use crate::models::{
    AiGradeResult, Appeal, AppealRequest, Assignment, GradeSubmissionRequest, Material,
    NewSubmission, ReviewAppealRequest, Subject, Submission,
};

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// 一条面向用户的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

pub struct DomainContext {
    coordinator: Arc<PersistenceCoordinator>,
    subjects: RwLock<Vec<Subject>>,
    assignments: RwLock<Vec<Assignment>>,
    materials: RwLock<Vec<Material>>,
    notifications: Mutex<VecDeque<Notification>>,
}

impl DomainContext {
    pub fn new(coordinator: Arc<PersistenceCoordinator>) -> Self {
        Self {
            coordinator,
            subjects: RwLock::new(Vec::new()),
            assignments: RwLock::new(Vec::new()),
            materials: RwLock::new(Vec::new()),
            notifications: Mutex::new(VecDeque::new()),
        }
    }

    /// 重新拉取全部集合并替换缓存
    ///
    /// 任一集合拉取失败则整体放弃，缓存保持刷新前的内容。
    pub async fn refresh_all(&self) -> Result<()> {
        let subjects = self.coordinator.get_subjects().await?;
        let assignments = self.coordinator.get_assignments().await?;
        let materials = self.coordinator.get_materials().await?;

        *self.subjects.write().await = subjects;
        *self.assignments.write().await = assignments;
        *self.materials.write().await = materials;
        debug!("Domain cache refreshed");
        Ok(())
    }

    // ---- 快照访问 ----

    pub async fn subjects(&self) -> Vec<Subject> {
        self.subjects.read().await.clone()
    }

    pub async fn assignments(&self) -> Vec<Assignment> {
        self.assignments.read().await.clone()
    }

    pub async fn materials(&self) -> Vec<Material> {
        self.materials.read().await.clone()
    }

    // ---- 派生查询（只读缓存，不触发 I/O）----

    pub async fn subject_by_id(&self, id: &str) -> Option<Subject> {
        self.subjects
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub async fn assignment_by_id(&self, id: &str) -> Option<Assignment> {
        self.assignments
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub async fn assignments_for_subject(&self, subject_id: &str) -> Vec<Assignment> {
        self.assignments
            .read()
            .await
            .iter()
            .filter(|a| a.subject_id == subject_id)
            .cloned()
            .collect()
    }

    pub async fn materials_for_subject(&self, subject_id: &str) -> Vec<Material> {
        self.materials
            .read()
            .await
            .iter()
            .filter(|m| m.subject_id == subject_id)
            .cloned()
            .collect()
    }

    /// 线性扫描所有作业内嵌的提交
    pub async fn submission_by_id(&self, id: &str) -> Option<Submission> {
        self.assignments
            .read()
            .await
            .iter()
            .flat_map(|a| a.submissions.iter())
            .find(|s| s.id == id)
            .cloned()
    }

    pub async fn submissions_for_assignment(&self, assignment_id: &str) -> Vec<Submission> {
        self.assignments
            .read()
            .await
            .iter()
            .find(|a| a.id == assignment_id)
            .map(|a| a.submissions.clone())
            .unwrap_or_default()
    }

    pub async fn submissions_by_student(&self, student_id: &str) -> Vec<Submission> {
        self.assignments
            .read()
            .await
            .iter()
            .flat_map(|a| a.submissions.iter())
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect()
    }

    // ---- 变更入口：成功后整体刷新，失败时缓存原样保留 ----

    pub async fn save_subject(&self, subject: Subject) -> Result<Subject> {
        self.mutate("Subject saved", self.coordinator.save_subject(subject))
            .await
    }

    pub async fn save_assignment(&self, assignment: Assignment) -> Result<Assignment> {
        self.mutate(
            "Assignment saved",
            self.coordinator.save_assignment(assignment),
        )
        .await
    }

    pub async fn save_material(&self, material: Material) -> Result<Material> {
        self.mutate("Material saved", self.coordinator.save_material(material))
            .await
    }

    pub async fn submit_assignment(
        &self,
        assignment_id: &str,
        submission: NewSubmission,
    ) -> Result<Submission> {
        self.mutate(
            "Assignment submitted",
            self.coordinator.submit_assignment(assignment_id, submission),
        )
        .await
    }

    pub async fn grade_submission(
        &self,
        submission_id: &str,
        request: GradeSubmissionRequest,
    ) -> Result<Submission> {
        self.mutate(
            "Submission graded",
            self.coordinator.grade_submission(submission_id, request),
        )
        .await
    }

    pub async fn submit_appeal(
        &self,
        submission_id: &str,
        request: AppealRequest,
    ) -> Result<Appeal> {
        self.mutate(
            "Appeal submitted",
            self.coordinator.submit_appeal(submission_id, request),
        )
        .await
    }

    pub async fn review_appeal(
        &self,
        submission_id: &str,
        request: ReviewAppealRequest,
    ) -> Result<Submission> {
        self.mutate(
            "Appeal reviewed",
            self.coordinator.review_appeal(submission_id, request),
        )
        .await
    }

    /// AI 评分不改动任何集合，因此不触发刷新
    pub async fn grade_homework(
        &self,
        task_file: &str,
        solution_file: &str,
        criteria: &str,
    ) -> Result<AiGradeResult> {
        match self
            .coordinator
            .grade_homework(task_file, solution_file, criteria)
            .await
        {
            Ok(result) => {
                self.notify_success("AI grading completed").await;
                Ok(result)
            }
            Err(e) => {
                self.notify_error(&e).await;
                Err(e)
            }
        }
    }

    // ---- 通知 ----

    /// 取走当前积压的全部通知
    pub async fn drain_notifications(&self) -> Vec<Notification> {
        self.notifications.lock().await.drain(..).collect()
    }

    async fn notify_success(&self, message: &str) {
        self.notifications.lock().await.push_back(Notification {
            level: NotificationLevel::Success,
            message: message.to_string(),
        });
    }

    async fn notify_error(&self, err: &GradiatorError) {
        error!("Operation failed: {}", err);
        self.notifications.lock().await.push_back(Notification {
            level: NotificationLevel::Error,
            message: err.message().to_string(),
        });
    }

    async fn mutate<T>(
        &self,
        success_message: &str,
        operation: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        match operation.await {
            Ok(value) => {
                // 变更后的刷新失败同样要转换为用户可见的通知
                if let Err(e) = self.refresh_all().await {
                    self.notify_error(&e).await;
                    return Err(e);
                }
                self.notify_success(success_message).await;
                Ok(value)
            }
            Err(e) => {
                self.notify_error(&e).await;
                Err(e)
            }
        }
    }
}
