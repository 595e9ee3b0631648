use std::path::Path;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::GradiatorConfig;
use crate::errors::{GradiatorError, Result};
use crate::gateway::RemoteApi;
use crate::models::{
    AiGradeResult, Appeal, AppealRequest, Assignment, GradeSubmissionRequest, Material,
    NewSubmission, ReviewAppealRequest, Subject, Submission,
};

/// 基于 reqwest 的远程网关
///
/// 所有请求都发往固定的基础 URL；非 2xx 响应一律转换为携带
/// HTTP 状态码（以及服务端错误消息，若有）的失败。
pub struct RemoteGateway {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteGateway {
    pub fn new(config: &GradiatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.remote.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 从失败响应中提取服务端错误消息
    async fn failure(op: &str, response: reqwest::Response) -> GradiatorError {
        let status = response.status();
        let body: Option<serde_json::Value> = response.json().await.ok();
        let server_msg = body
            .as_ref()
            .and_then(|v| {
                v.pointer("/detail/error")
                    .and_then(|m| m.as_str())
                    .or_else(|| v.get("message").and_then(|m| m.as_str()))
            })
            .map(str::to_owned);

        match server_msg {
            Some(msg) => {
                GradiatorError::remote_unreachable(format!("{op} failed with {status}: {msg}"))
            }
            None => GradiatorError::remote_unreachable(format!("{op} failed with {status}")),
        }
    }

    async fn decode<T: DeserializeOwned>(op: &str, response: reqwest::Response) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(Self::failure(op, response).await)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, op: &str, path: &str) -> Result<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(op, response).await
    }

    /// GET 单实体，404 映射为 None
    async fn get_optional<T: DeserializeOwned>(&self, op: &str, path: &str) -> Result<Option<T>> {
        let response = self.client.get(self.url(path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode(op, response).await.map(Some)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        op: &str,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(op, response).await
    }

    async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        op: &str,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::decode(op, response).await
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        op: &str,
        path: &str,
        form: Form,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await?;
        Self::decode(op, response).await
    }

    /// 从本地文件引用构造 multipart 附件
    async fn file_part(reference: &str) -> Result<Part> {
        let bytes = tokio::fs::read(reference)
            .await
            .map_err(|e| GradiatorError::file_operation(format!("Cannot read {reference}: {e}")))?;
        let file_name = Path::new(reference)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| reference.to_string());
        Ok(Part::bytes(bytes).file_name(file_name))
    }
}

#[async_trait]
impl RemoteApi for RemoteGateway {
    async fn probe(&self) -> Result<()> {
        let response = self.client.get(&self.base_url).send().await?;
        if response.status().is_success() {
            debug!("Remote probe succeeded against {}", self.base_url);
            Ok(())
        } else {
            Err(GradiatorError::remote_unreachable(format!(
                "Probe returned {}",
                response.status()
            )))
        }
    }

    async fn get_subjects(&self) -> Result<Vec<Subject>> {
        self.get_json("get_subjects", "/api/subjects").await
    }

    async fn get_subject_by_id(&self, id: &str) -> Result<Option<Subject>> {
        self.get_optional("get_subject_by_id", &format!("/api/subjects/{id}"))
            .await
    }

    async fn save_subject(&self, subject: Subject) -> Result<Subject> {
        if subject.id.is_empty() {
            self.post_json("save_subject", "/api/subjects", &subject)
                .await
        } else {
            let path = format!("/api/subjects/{}", subject.id);
            self.put_json("save_subject", &path, &subject).await
        }
    }

    async fn get_assignments(&self) -> Result<Vec<Assignment>> {
        self.get_json("get_assignments", "/api/assignments").await
    }

    async fn get_assignment_by_id(&self, id: &str) -> Result<Option<Assignment>> {
        self.get_optional("get_assignment_by_id", &format!("/api/assignments/{id}"))
            .await
    }

    async fn get_assignments_for_subject(&self, subject_id: &str) -> Result<Vec<Assignment>> {
        self.get_json(
            "get_assignments_for_subject",
            &format!("/api/subjects/{subject_id}/assignments"),
        )
        .await
    }

    async fn save_assignment(&self, assignment: Assignment) -> Result<Assignment> {
        if assignment.id.is_empty() {
            // 新建走 multipart，与服务端的创建端点一致
            let mut form = Form::new()
                .text("title", assignment.title.clone())
                .text("subject_id", assignment.subject_id.clone())
                .text("description", assignment.description.clone())
                .text("due_date", assignment.due_date.clone())
                .text("assignment_type", assignment.kind.to_string())
                .text("max_grade", assignment.max_grade.to_string());
            if let Some(criteria) = &assignment.criteria {
                form = form.text("criteria", criteria.clone());
            }
            self.post_multipart("save_assignment", "/api/assignments", form)
                .await
        } else {
            let path = format!("/api/assignments/{}", assignment.id);
            self.put_json("save_assignment", &path, &assignment).await
        }
    }

    async fn get_materials(&self) -> Result<Vec<Material>> {
        self.get_json("get_materials", "/api/materials").await
    }

    async fn get_material_by_id(&self, id: &str) -> Result<Option<Material>> {
        self.get_optional("get_material_by_id", &format!("/api/materials/{id}"))
            .await
    }

    async fn get_materials_for_subject(&self, subject_id: &str) -> Result<Vec<Material>> {
        self.get_json(
            "get_materials_for_subject",
            &format!("/api/subjects/{subject_id}/materials"),
        )
        .await
    }

    async fn save_material(&self, material: Material) -> Result<Material> {
        let file = Self::file_part(&material.file_url).await?;
        let form = Form::new()
            .text("title", material.title.clone())
            .text("subject_id", material.subject_id.clone())
            .text("description", material.description.clone())
            .text("material_type", material.kind.to_string())
            .part("file", file);
        self.post_multipart("save_material", "/api/materials", form)
            .await
    }

    async fn get_submission_by_id(&self, id: &str) -> Result<Option<Submission>> {
        self.get_optional("get_submission_by_id", &format!("/api/submissions/{id}"))
            .await
    }

    async fn get_submissions_for_assignment(&self, assignment_id: &str) -> Result<Vec<Submission>> {
        self.get_json(
            "get_submissions_for_assignment",
            &format!("/api/assignments/{assignment_id}/submissions"),
        )
        .await
    }

    async fn get_submissions_by_student(&self, student_id: &str) -> Result<Vec<Submission>> {
        self.get_json(
            "get_submissions_by_student",
            &format!("/api/students/{student_id}/submissions"),
        )
        .await
    }

    async fn submit_assignment(
        &self,
        assignment_id: &str,
        submission: NewSubmission,
    ) -> Result<Submission> {
        let mut form = Form::new()
            .text("student_id", submission.student_id.clone())
            .text("student_name", submission.student_name.clone());
        for reference in &submission.files {
            form = form.part("files", Self::file_part(reference).await?);
        }
        self.post_multipart(
            "submit_assignment",
            &format!("/api/assignments/{assignment_id}/submit"),
            form,
        )
        .await
    }

    async fn grade_submission(
        &self,
        submission_id: &str,
        request: GradeSubmissionRequest,
    ) -> Result<Submission> {
        self.post_json(
            "grade_submission",
            &format!("/api/submissions/{submission_id}/grade"),
            &request,
        )
        .await
    }

    async fn submit_appeal(&self, submission_id: &str, request: AppealRequest) -> Result<Appeal> {
        self.post_json(
            "submit_appeal",
            &format!("/api/submissions/{submission_id}/appeal"),
            &request,
        )
        .await
    }

    async fn review_appeal(
        &self,
        submission_id: &str,
        request: ReviewAppealRequest,
    ) -> Result<Submission> {
        self.post_json(
            "review_appeal",
            &format!("/api/submissions/{submission_id}/review-appeal"),
            &request,
        )
        .await
    }

    async fn grade_homework(
        &self,
        task_file: &str,
        solution_file: &str,
        criteria: &str,
    ) -> Result<AiGradeResult> {
        let form = Form::new()
            .part("task_file", Self::file_part(task_file).await?)
            .part("solution_file", Self::file_part(solution_file).await?)
            .text("criteria", criteria.to_string());
        self.post_multipart("grade_homework", "/api/grade", form)
            .await
    }
}
