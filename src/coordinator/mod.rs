//! 持久化协调器
//!
//! 决定每个操作由哪个后端存储响应：启动时对远程服务做一次
//! 可达性探测，成功则远程模式，否则本地模式。远程模式下的
//! 网络失败把协调器降级为本地模式（粘性降级，会话内不回升），
//! 失败的写操作会以相同的变更语义在本地重放，读操作回退为本地读取；
//! 非网络失败原样向上传播，不触发降级。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::{GradiatorError, Result};
use crate::gateway::RemoteApi;
use crate::models::{
    AiGradeResult, Appeal, AppealRequest, Assignment, GradeSubmissionRequest, Material,
    NewSubmission, ReviewAppealRequest, Subject, Submission,
};

pub mod local;

pub use local::LocalEducationStore;

/// 协调器的后端模式（整个协调器一份，不按实体区分）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Probing,
    RemoteActive,
    LocalActive,
}

pub struct PersistenceCoordinator {
    remote: Arc<dyn RemoteApi>,
    local: LocalEducationStore,
    mode: RwLock<BackendMode>,
}

/// 远程优先、失败降级的操作包装
///
/// 仅网络层面的失败触发降级并对本地存储重放同一逻辑操作，
/// 其余错误（如客户端文件不可读）原样向上传播，不影响远程会话。
/// 调用处对 owned 参数显式 clone，远程与本地各消耗一份。
macro_rules! with_failover {
    ($self:ident, $op:ident ( $($arg:expr),* )) => {{
        if $self.remote_active().await {
            match $self.remote.$op($($arg),*).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_unreachable() => $self.demote(stringify!($op), &e).await,
                Err(e) => return Err(e),
            }
        }
        $self.local.$op($($arg),*).await
    }};
}

impl PersistenceCoordinator {
    /// 构造一个尚未探测的协调器（初始为 Probing，按本地处理）
    pub fn new(remote: Arc<dyn RemoteApi>, local: LocalEducationStore) -> Self {
        Self {
            remote,
            local,
            mode: RwLock::new(BackendMode::Probing),
        }
    }

    /// 构造并完成一次可达性探测
    pub async fn connect(
        remote: Arc<dyn RemoteApi>,
        local: LocalEducationStore,
        probe_timeout: Duration,
    ) -> Self {
        let coordinator = Self::new(remote, local);
        coordinator.probe(probe_timeout).await;
        coordinator
    }

    /// 探测远程服务并落定模式
    ///
    /// 只在启动（或显式调用）时执行；会话内没有后台重探，
    /// 一旦降级便保持本地模式。
    pub async fn probe(&self, timeout: Duration) {
        let outcome = tokio::time::timeout(timeout, self.remote.probe()).await;
        let mut mode = self.mode.write().await;
        *mode = match outcome {
            Ok(Ok(())) => {
                info!("Remote service reachable, operating in remote mode");
                BackendMode::RemoteActive
            }
            Ok(Err(e)) => {
                warn!("Remote probe failed, operating in local mode: {}", e);
                BackendMode::LocalActive
            }
            Err(_) => {
                warn!(
                    "Remote probe timed out after {:?}, operating in local mode",
                    timeout
                );
                BackendMode::LocalActive
            }
        };
    }

    pub async fn mode(&self) -> BackendMode {
        *self.mode.read().await
    }

    async fn remote_active(&self) -> bool {
        *self.mode.read().await == BackendMode::RemoteActive
    }

    /// 粘性降级：记录原因并切换到本地模式
    async fn demote(&self, op: &str, err: &GradiatorError) {
        warn!(
            "Remote {} failed, demoting to local mode for the rest of the session: {}",
            op, err
        );
        *self.mode.write().await = BackendMode::LocalActive;
    }

    /// 本地存储为空时写入示例数据（仅作用于本地后端）
    pub async fn initialize_local_if_empty(&self) -> Result<()> {
        self.local.initialize_if_empty().await
    }

    // ---- 读操作：远程失败时回退为本地读取，不向上抛网络错误 ----

    pub async fn get_subjects(&self) -> Result<Vec<Subject>> {
        with_failover!(self, get_subjects())
    }

    pub async fn get_subject_by_id(&self, id: &str) -> Result<Option<Subject>> {
        with_failover!(self, get_subject_by_id(id))
    }

    pub async fn get_assignments(&self) -> Result<Vec<Assignment>> {
        with_failover!(self, get_assignments())
    }

    pub async fn get_assignment_by_id(&self, id: &str) -> Result<Option<Assignment>> {
        with_failover!(self, get_assignment_by_id(id))
    }

    pub async fn get_assignments_for_subject(&self, subject_id: &str) -> Result<Vec<Assignment>> {
        with_failover!(self, get_assignments_for_subject(subject_id))
    }

    pub async fn get_materials(&self) -> Result<Vec<Material>> {
        with_failover!(self, get_materials())
    }

    pub async fn get_material_by_id(&self, id: &str) -> Result<Option<Material>> {
        with_failover!(self, get_material_by_id(id))
    }

    pub async fn get_materials_for_subject(&self, subject_id: &str) -> Result<Vec<Material>> {
        with_failover!(self, get_materials_for_subject(subject_id))
    }

    pub async fn get_submission_by_id(&self, id: &str) -> Result<Option<Submission>> {
        with_failover!(self, get_submission_by_id(id))
    }

    pub async fn get_submissions_for_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<Submission>> {
        with_failover!(self, get_submissions_for_assignment(assignment_id))
    }

    pub async fn get_submissions_by_student(&self, student_id: &str) -> Result<Vec<Submission>> {
        with_failover!(self, get_submissions_by_student(student_id))
    }

    // ---- 写操作：远程失败时降级，并以相同语义在本地重放 ----

    pub async fn save_subject(&self, subject: Subject) -> Result<Subject> {
        with_failover!(self, save_subject(subject.clone()))
    }

    pub async fn save_assignment(&self, assignment: Assignment) -> Result<Assignment> {
        with_failover!(self, save_assignment(assignment.clone()))
    }

    pub async fn save_material(&self, material: Material) -> Result<Material> {
        with_failover!(self, save_material(material.clone()))
    }

    pub async fn submit_assignment(
        &self,
        assignment_id: &str,
        submission: NewSubmission,
    ) -> Result<Submission> {
        with_failover!(self, submit_assignment(assignment_id, submission.clone()))
    }

    pub async fn grade_submission(
        &self,
        submission_id: &str,
        request: GradeSubmissionRequest,
    ) -> Result<Submission> {
        with_failover!(self, grade_submission(submission_id, request.clone()))
    }

    pub async fn submit_appeal(
        &self,
        submission_id: &str,
        request: AppealRequest,
    ) -> Result<Appeal> {
        with_failover!(self, submit_appeal(submission_id, request.clone()))
    }

    pub async fn review_appeal(
        &self,
        submission_id: &str,
        request: ReviewAppealRequest,
    ) -> Result<Submission> {
        with_failover!(self, review_appeal(submission_id, request.clone()))
    }

    // ---- 仅远程提供的操作 ----

    /// AI 评分没有本地替代实现，本地模式下直接报告不可用
    pub async fn grade_homework(
        &self,
        task_file: &str,
        solution_file: &str,
        criteria: &str,
    ) -> Result<AiGradeResult> {
        if self.remote_active().await {
            match self
                .remote
                .grade_homework(task_file, solution_file, criteria)
                .await
            {
                Ok(result) => return Ok(result),
                Err(e) if e.is_unreachable() => self.demote("grade_homework", &e).await,
                Err(e) => return Err(e),
            }
        }
        Err(GradiatorError::remote_unreachable(
            "AI grading requires the remote grading service",
        ))
    }
}

/// 测试用的远程桩
#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;

    use super::*;

    /// 全部操作都以固定错误失败的远程桩
    pub(crate) struct FailingRemote {
        error: fn() -> GradiatorError,
    }

    impl FailingRemote {
        /// 模拟不可达的后端
        pub(crate) fn unreachable() -> Self {
            Self {
                error: || GradiatorError::remote_unreachable("connection refused"),
            }
        }

        /// 模拟客户端侧的文件读取失败
        pub(crate) fn file_operation() -> Self {
            Self {
                error: || GradiatorError::file_operation("Cannot read answer.pdf"),
            }
        }

        fn fail<T>(&self) -> Result<T> {
            Err((self.error)())
        }
    }

    #[async_trait]
    impl RemoteApi for FailingRemote {
        async fn probe(&self) -> Result<()> {
            self.fail()
        }
        async fn get_subjects(&self) -> Result<Vec<Subject>> {
            self.fail()
        }
        async fn get_subject_by_id(&self, _id: &str) -> Result<Option<Subject>> {
            self.fail()
        }
        async fn save_subject(&self, _subject: Subject) -> Result<Subject> {
            self.fail()
        }
        async fn get_assignments(&self) -> Result<Vec<Assignment>> {
            self.fail()
        }
        async fn get_assignment_by_id(&self, _id: &str) -> Result<Option<Assignment>> {
            self.fail()
        }
        async fn get_assignments_for_subject(&self, _subject_id: &str) -> Result<Vec<Assignment>> {
            self.fail()
        }
        async fn save_assignment(&self, _assignment: Assignment) -> Result<Assignment> {
            self.fail()
        }
        async fn get_materials(&self) -> Result<Vec<Material>> {
            self.fail()
        }
        async fn get_material_by_id(&self, _id: &str) -> Result<Option<Material>> {
            self.fail()
        }
        async fn get_materials_for_subject(&self, _subject_id: &str) -> Result<Vec<Material>> {
            self.fail()
        }
        async fn save_material(&self, _material: Material) -> Result<Material> {
            self.fail()
        }
        async fn get_submission_by_id(&self, _id: &str) -> Result<Option<Submission>> {
            self.fail()
        }
        async fn get_submissions_for_assignment(
            &self,
            _assignment_id: &str,
        ) -> Result<Vec<Submission>> {
            self.fail()
        }
        async fn get_submissions_by_student(&self, _student_id: &str) -> Result<Vec<Submission>> {
            self.fail()
        }
        async fn submit_assignment(
            &self,
            _assignment_id: &str,
            _submission: NewSubmission,
        ) -> Result<Submission> {
            self.fail()
        }
        async fn grade_submission(
            &self,
            _submission_id: &str,
            _request: GradeSubmissionRequest,
        ) -> Result<Submission> {
            self.fail()
        }
        async fn submit_appeal(
            &self,
            _submission_id: &str,
            _request: AppealRequest,
        ) -> Result<Appeal> {
            self.fail()
        }
        async fn review_appeal(
            &self,
            _submission_id: &str,
            _request: ReviewAppealRequest,
        ) -> Result<Submission> {
            self.fail()
        }
        async fn grade_homework(
            &self,
            _task_file: &str,
            _solution_file: &str,
            _criteria: &str,
        ) -> Result<AiGradeResult> {
            self.fail()
        }
    }
}
