//! 远程服务网关
//!
//! `RemoteApi` 为远程评分服务的操作接口，按实体各暴露一个方法；
//! `RemoteGateway` 是基于 reqwest 的实现。本层不做重试，
//! 重试与降级是协调器的职责。

use std::sync::Arc;

use crate::config::GradiatorConfig;
use crate::errors::Result;
use crate::models::{
    AiGradeResult, Appeal, AppealRequest, Assignment, GradeSubmissionRequest, Material,
    NewSubmission, ReviewAppealRequest, Subject, Submission,
};

pub mod http;

#[async_trait::async_trait]
pub trait RemoteApi: Send + Sync {
    /// 可达性探测
    // 对基础 URL 的轻量 GET，探测超时由协调器控制
    async fn probe(&self) -> Result<()>;

    /// 科目
    async fn get_subjects(&self) -> Result<Vec<Subject>>;
    async fn get_subject_by_id(&self, id: &str) -> Result<Option<Subject>>;
    async fn save_subject(&self, subject: Subject) -> Result<Subject>;

    /// 作业
    async fn get_assignments(&self) -> Result<Vec<Assignment>>;
    async fn get_assignment_by_id(&self, id: &str) -> Result<Option<Assignment>>;
    async fn get_assignments_for_subject(&self, subject_id: &str) -> Result<Vec<Assignment>>;
    async fn save_assignment(&self, assignment: Assignment) -> Result<Assignment>;

    /// 课程材料
    async fn get_materials(&self) -> Result<Vec<Material>>;
    async fn get_material_by_id(&self, id: &str) -> Result<Option<Material>>;
    async fn get_materials_for_subject(&self, subject_id: &str) -> Result<Vec<Material>>;
    async fn save_material(&self, material: Material) -> Result<Material>;

    /// 提交
    async fn get_submission_by_id(&self, id: &str) -> Result<Option<Submission>>;
    async fn get_submissions_for_assignment(&self, assignment_id: &str) -> Result<Vec<Submission>>;
    async fn get_submissions_by_student(&self, student_id: &str) -> Result<Vec<Submission>>;
    async fn submit_assignment(
        &self,
        assignment_id: &str,
        submission: NewSubmission,
    ) -> Result<Submission>;
    async fn grade_submission(
        &self,
        submission_id: &str,
        request: GradeSubmissionRequest,
    ) -> Result<Submission>;

    /// 申诉
    async fn submit_appeal(&self, submission_id: &str, request: AppealRequest) -> Result<Appeal>;
    async fn review_appeal(
        &self,
        submission_id: &str,
        request: ReviewAppealRequest,
    ) -> Result<Submission>;

    /// AI 评分（仅远程提供）
    async fn grade_homework(
        &self,
        task_file: &str,
        solution_file: &str,
        criteria: &str,
    ) -> Result<AiGradeResult>;
}

/// 根据配置创建远程网关
pub fn create_remote_api(config: &GradiatorConfig) -> Result<Arc<dyn RemoteApi>> {
    let gateway = http::RemoteGateway::new(config)?;
    Ok(Arc::new(gateway))
}
