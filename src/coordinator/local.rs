use chrono::{Days, NaiveDate};
use tokio::sync::Mutex;
use tracing::debug;

use crate::data;
use crate::errors::{GradiatorError, Result};
use crate::models::{
    Appeal, AppealRequest, AppealStatus, Assignment, GradeSubmissionRequest, Material,
    NewSubmission, ReviewAppealRequest, Subject, Submission, SubmissionStatus,
};
use crate::storage::JsonStore;

// 每个集合一个键值条目，提交与申诉内嵌在所属作业的 JSON 中
const SUBJECTS_KEY: &str = "subjects";
const ASSIGNMENTS_KEY: &str = "assignments";
const MATERIALS_KEY: &str = "materials";

// 申诉截止日期为作业截止日期后 5 天
const APPEAL_WINDOW_DAYS: u64 = 5;

/// 本地模式的实体存储
///
/// 在键值存储之上实现全部实体变更语义：ID 分配、状态派生、
/// 内嵌集合更新。每次变更整体持久化所在集合。
/// 每个集合的读-改-写周期由各自的互斥锁保护，
/// 避免并发调用相互覆盖。
pub struct LocalEducationStore {
    store: JsonStore,
    subjects_lock: Mutex<()>,
    assignments_lock: Mutex<()>,
    materials_lock: Mutex<()>,
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// 派生申诉截止日期：截止日期 + 5 天
fn derive_appeal_deadline(due_date: &str) -> Result<String> {
    let due = NaiveDate::parse_from_str(due_date, "%Y-%m-%d")?;
    let deadline = due
        .checked_add_days(Days::new(APPEAL_WINDOW_DAYS))
        .ok_or_else(|| GradiatorError::date_parse(format!("Due date {due_date} out of range")))?;
    Ok(deadline.format("%Y-%m-%d").to_string())
}

impl LocalEducationStore {
    pub fn new(store: JsonStore) -> Self {
        Self {
            store,
            subjects_lock: Mutex::new(()),
            assignments_lock: Mutex::new(()),
            materials_lock: Mutex::new(()),
        }
    }

    /// 本地存储为空时写入示例数据
    ///
    /// 持有全部集合锁，且每个集合只在自身为空时写入，
    /// 已提交的数据不会被示例数据覆盖。
    pub async fn initialize_if_empty(&self) -> Result<()> {
        let _subjects_guard = self.subjects_lock.lock().await;
        let _assignments_guard = self.assignments_lock.lock().await;
        let _materials_guard = self.materials_lock.lock().await;

        let subjects: Vec<Subject> = self.store.get(SUBJECTS_KEY, vec![]).await;
        if subjects.is_empty() {
            debug!("Subject collection is empty, seeding sample data");
            self.store.set(SUBJECTS_KEY, &data::seed_subjects()).await?;
        }

        let assignments: Vec<Assignment> = self.store.get(ASSIGNMENTS_KEY, vec![]).await;
        if assignments.is_empty() {
            self.store
                .set(ASSIGNMENTS_KEY, &data::seed_assignments())
                .await?;
        }

        let materials: Vec<Material> = self.store.get(MATERIALS_KEY, vec![]).await;
        if materials.is_empty() {
            self.store
                .set(MATERIALS_KEY, &data::seed_materials())
                .await?;
        }
        Ok(())
    }

    /// 作业集合的读-改-写周期，持锁执行
    async fn update_assignments<T>(
        &self,
        mutate: impl FnOnce(&mut Vec<Assignment>) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.assignments_lock.lock().await;
        let mut assignments: Vec<Assignment> = self.store.get(ASSIGNMENTS_KEY, vec![]).await;
        let out = mutate(&mut assignments)?;
        self.store.set(ASSIGNMENTS_KEY, &assignments).await?;
        Ok(out)
    }

    // ---- 科目 ----

    pub async fn get_subjects(&self) -> Result<Vec<Subject>> {
        Ok(self.store.get(SUBJECTS_KEY, vec![]).await)
    }

    pub async fn get_subject_by_id(&self, id: &str) -> Result<Option<Subject>> {
        let subjects = self.get_subjects().await?;
        Ok(subjects.into_iter().find(|s| s.id == id))
    }

    pub async fn save_subject(&self, mut subject: Subject) -> Result<Subject> {
        let _guard = self.subjects_lock.lock().await;
        let mut subjects: Vec<Subject> = self.store.get(SUBJECTS_KEY, vec![]).await;

        if subject.id.is_empty() {
            subject.id = generate_id();
        }
        match subjects.iter_mut().find(|s| s.id == subject.id) {
            Some(existing) => *existing = subject.clone(),
            None => subjects.push(subject.clone()),
        }

        self.store.set(SUBJECTS_KEY, &subjects).await?;
        Ok(subject)
    }

    // ---- 作业 ----

    pub async fn get_assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.store.get(ASSIGNMENTS_KEY, vec![]).await)
    }

    pub async fn get_assignment_by_id(&self, id: &str) -> Result<Option<Assignment>> {
        let assignments = self.get_assignments().await?;
        Ok(assignments.into_iter().find(|a| a.id == id))
    }

    pub async fn get_assignments_for_subject(&self, subject_id: &str) -> Result<Vec<Assignment>> {
        let assignments = self.get_assignments().await?;
        Ok(assignments
            .into_iter()
            .filter(|a| a.subject_id == subject_id)
            .collect())
    }

    /// 按 ID 插入或替换作业
    ///
    /// 没有 ID 的作业视为新建：分配 ID，并在缺省时派生申诉截止日期。
    pub async fn save_assignment(&self, mut assignment: Assignment) -> Result<Assignment> {
        if assignment.id.is_empty() {
            assignment.id = generate_id();
            if assignment.appeal_deadline.is_none() {
                assignment.appeal_deadline = Some(derive_appeal_deadline(&assignment.due_date)?);
            }
        }

        self.update_assignments(|assignments| {
            match assignments.iter_mut().find(|a| a.id == assignment.id) {
                Some(existing) => *existing = assignment.clone(),
                None => assignments.push(assignment.clone()),
            }
            Ok(assignment.clone())
        })
        .await
    }

    // ---- 课程材料 ----

    pub async fn get_materials(&self) -> Result<Vec<Material>> {
        Ok(self.store.get(MATERIALS_KEY, vec![]).await)
    }

    pub async fn get_material_by_id(&self, id: &str) -> Result<Option<Material>> {
        let materials = self.get_materials().await?;
        Ok(materials.into_iter().find(|m| m.id == id))
    }

    pub async fn get_materials_for_subject(&self, subject_id: &str) -> Result<Vec<Material>> {
        let materials = self.get_materials().await?;
        Ok(materials
            .into_iter()
            .filter(|m| m.subject_id == subject_id)
            .collect())
    }

    pub async fn save_material(&self, mut material: Material) -> Result<Material> {
        let _guard = self.materials_lock.lock().await;
        let mut materials: Vec<Material> = self.store.get(MATERIALS_KEY, vec![]).await;

        if material.id.is_empty() {
            material.id = generate_id();
        }
        match materials.iter_mut().find(|m| m.id == material.id) {
            Some(existing) => *existing = material.clone(),
            None => materials.push(material.clone()),
        }

        self.store.set(MATERIALS_KEY, &materials).await?;
        Ok(material)
    }

    // ---- 提交 ----

    pub async fn get_submission_by_id(&self, id: &str) -> Result<Option<Submission>> {
        let assignments = self.get_assignments().await?;
        Ok(assignments
            .into_iter()
            .flat_map(|a| a.submissions)
            .find(|s| s.id == id))
    }

    pub async fn get_submissions_for_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<Submission>> {
        let assignment = self.get_assignment_by_id(assignment_id).await?;
        Ok(assignment.map(|a| a.submissions).unwrap_or_default())
    }

    pub async fn get_submissions_by_student(&self, student_id: &str) -> Result<Vec<Submission>> {
        let assignments = self.get_assignments().await?;
        Ok(assignments
            .into_iter()
            .flat_map(|a| a.submissions)
            .filter(|s| s.student_id == student_id)
            .collect())
    }

    /// 向作业追加一条提交
    pub async fn submit_assignment(
        &self,
        assignment_id: &str,
        submission: NewSubmission,
    ) -> Result<Submission> {
        let assignment_id = assignment_id.to_string();
        self.update_assignments(move |assignments| {
            let assignment = assignments
                .iter_mut()
                .find(|a| a.id == assignment_id)
                .ok_or_else(|| {
                    GradiatorError::not_found(format!("Assignment {assignment_id} not found"))
                })?;

            let created = Submission {
                id: generate_id(),
                assignment_id: assignment_id.clone(),
                student_id: submission.student_id,
                student_name: submission.student_name,
                files: submission.files,
                submitted_at: submission.submitted_at,
                status: SubmissionStatus::Submitted,
                grade: None,
                feedback: None,
                appeal: None,
            };

            assignment.submissions.push(created.clone());
            assignment.refresh_derived();
            Ok(created)
        })
        .await
    }

    /// 为提交评分，并派生所属作业的聚合状态
    pub async fn grade_submission(
        &self,
        submission_id: &str,
        request: GradeSubmissionRequest,
    ) -> Result<Submission> {
        if !(0..=100).contains(&request.grade) {
            return Err(GradiatorError::validation(format!(
                "Grade must be between 0 and 100, got {}",
                request.grade
            )));
        }

        let submission_id = submission_id.to_string();
        self.update_assignments(move |assignments| {
            for assignment in assignments.iter_mut() {
                if let Some(submission) = assignment
                    .submissions
                    .iter_mut()
                    .find(|s| s.id == submission_id)
                {
                    submission.status = SubmissionStatus::Graded;
                    submission.grade = Some(request.grade);
                    submission.feedback = Some(request.feedback);
                    let updated = submission.clone();
                    assignment.refresh_derived();
                    return Ok(updated);
                }
            }
            Err(GradiatorError::not_found(format!(
                "Submission {submission_id} not found"
            )))
        })
        .await
    }

    // ---- 申诉 ----

    /// 对已评分的提交发起申诉
    ///
    /// 提交没有非零成绩时拒绝并返回 InvalidState。
    pub async fn submit_appeal(
        &self,
        submission_id: &str,
        request: AppealRequest,
    ) -> Result<Appeal> {
        let submission_id = submission_id.to_string();
        self.update_assignments(move |assignments| {
            for assignment in assignments.iter_mut() {
                if let Some(submission) = assignment
                    .submissions
                    .iter_mut()
                    .find(|s| s.id == submission_id)
                {
                    if !submission.appealable() {
                        return Err(GradiatorError::invalid_state(format!(
                            "Submission {submission_id} has no grade to appeal"
                        )));
                    }

                    let appeal = Appeal {
                        id: generate_id(),
                        submission_id: submission_id.clone(),
                        reason: request.reason,
                        status: AppealStatus::Pending,
                        created_at: now_rfc3339(),
                        reviewed_at: None,
                        // 留存被申诉成绩的快照；appealable 已保证其存在
                        original_grade: submission.grade.unwrap_or_default(),
                    };

                    submission.appeal = Some(appeal.clone());
                    assignment.refresh_derived();
                    return Ok(appeal);
                }
            }
            Err(GradiatorError::not_found(format!(
                "Submission {submission_id} not found"
            )))
        })
        .await
    }

    /// 复核申诉：覆盖成绩与评语，关闭申诉并重算作业的申诉标记
    pub async fn review_appeal(
        &self,
        submission_id: &str,
        request: ReviewAppealRequest,
    ) -> Result<Submission> {
        let submission_id = submission_id.to_string();
        self.update_assignments(move |assignments| {
            for assignment in assignments.iter_mut() {
                if let Some(submission) = assignment
                    .submissions
                    .iter_mut()
                    .find(|s| s.id == submission_id)
                {
                    let Some(appeal) = submission.appeal.as_mut() else {
                        return Err(GradiatorError::invalid_state(format!(
                            "Submission {submission_id} has no appeal to review"
                        )));
                    };

                    appeal.status = AppealStatus::Reviewed;
                    appeal.reviewed_at = Some(now_rfc3339());
                    submission.grade = Some(request.grade);
                    submission.feedback = Some(request.feedback);
                    submission.status = SubmissionStatus::Graded;

                    let updated = submission.clone();
                    assignment.refresh_derived();
                    return Ok(updated);
                }
            }
            Err(GradiatorError::not_found(format!(
                "Submission {submission_id} not found"
            )))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentStatus, AssignmentType};
    use crate::storage::memory::MemoryStore;
    use std::sync::Arc;

    fn local_store() -> LocalEducationStore {
        let inner = Arc::new(MemoryStore::default());
        LocalEducationStore::new(JsonStore::new(inner, "gradiator_"))
    }

    fn draft_assignment(title: &str) -> Assignment {
        Assignment {
            id: String::new(),
            title: title.to_string(),
            subject_id: "2".to_string(),
            description: "desc".to_string(),
            due_date: "2024-06-01".to_string(),
            kind: AssignmentType::Homework,
            status: AssignmentStatus::Upcoming,
            max_grade: 100,
            criteria: None,
            appeal_deadline: None,
            has_appeal: false,
            submissions: vec![],
        }
    }

    fn new_submission(student_id: &str) -> NewSubmission {
        NewSubmission {
            student_id: student_id.to_string(),
            student_name: "John Doe".to_string(),
            files: vec!["answer.pdf".to_string()],
            submitted_at: "2024-05-30T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_assignment_assigns_id_and_appeal_deadline() {
        let store = local_store();
        let saved = store.save_assignment(draft_assignment("HW1")).await.unwrap();

        assert!(!saved.id.is_empty());
        assert_eq!(saved.appeal_deadline.as_deref(), Some("2024-06-06"));
    }

    #[tokio::test]
    async fn test_save_assignment_invalid_due_date() {
        let store = local_store();
        let mut draft = draft_assignment("HW1");
        draft.due_date = "not-a-date".to_string();
        let err = store.save_assignment(draft).await.unwrap_err();
        assert_eq!(err.code(), "E010");
    }

    #[tokio::test]
    async fn test_save_then_get_round_trip() {
        let store = local_store();
        let saved = store.save_assignment(draft_assignment("HW1")).await.unwrap();
        let fetched = store.get_assignment_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_save_assignment_upserts_by_id() {
        let store = local_store();
        let mut saved = store.save_assignment(draft_assignment("HW1")).await.unwrap();
        saved.title = "HW1 (revised)".to_string();
        store.save_assignment(saved.clone()).await.unwrap();

        let assignments = store.get_assignments().await.unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].title, "HW1 (revised)");
    }

    #[tokio::test]
    async fn test_submissions_empty_for_fresh_assignment() {
        let store = local_store();
        let saved = store.save_assignment(draft_assignment("HW1")).await.unwrap();
        let submissions = store.get_submissions_for_assignment(&saved.id).await.unwrap();
        assert!(submissions.is_empty());
    }

    #[tokio::test]
    async fn test_submit_assignment_appends_and_derives_status() {
        let store = local_store();
        let assignment = store.save_assignment(draft_assignment("HW1")).await.unwrap();

        let first = store
            .submit_assignment(&assignment.id, new_submission("student1"))
            .await
            .unwrap();
        let second = store
            .submit_assignment(&assignment.id, new_submission("student2"))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let updated = store
            .get_assignment_by_id(&assignment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AssignmentStatus::Submitted);
        assert_eq!(updated.submissions.last().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_submit_assignment_unknown_id() {
        let store = local_store();
        let err = store
            .submit_assignment("missing", new_submission("student1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E002");
    }

    #[tokio::test]
    async fn test_grade_submission_sets_both_statuses() {
        let store = local_store();
        let assignment = store.save_assignment(draft_assignment("HW1")).await.unwrap();
        let submission = store
            .submit_assignment(&assignment.id, new_submission("student1"))
            .await
            .unwrap();

        let graded = store
            .grade_submission(
                &submission.id,
                GradeSubmissionRequest {
                    grade: 85,
                    feedback: "Good".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(graded.status, SubmissionStatus::Graded);
        assert_eq!(graded.grade, Some(85));
        let updated = store
            .get_assignment_by_id(&assignment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AssignmentStatus::Graded);
    }

    #[tokio::test]
    async fn test_grade_submission_partial_grading_keeps_submitted() {
        let store = local_store();
        let assignment = store.save_assignment(draft_assignment("HW1")).await.unwrap();
        let first = store
            .submit_assignment(&assignment.id, new_submission("student1"))
            .await
            .unwrap();
        store
            .submit_assignment(&assignment.id, new_submission("student2"))
            .await
            .unwrap();

        store
            .grade_submission(
                &first.id,
                GradeSubmissionRequest {
                    grade: 70,
                    feedback: "ok".to_string(),
                },
            )
            .await
            .unwrap();

        // 仍有未评分提交，聚合状态保持 submitted
        let updated = store
            .get_assignment_by_id(&assignment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AssignmentStatus::Submitted);
    }

    #[tokio::test]
    async fn test_grade_submission_rejects_out_of_range() {
        let store = local_store();
        let err = store
            .grade_submission(
                "any",
                GradeSubmissionRequest {
                    grade: 101,
                    feedback: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[tokio::test]
    async fn test_grading_leaves_other_assignments_untouched() {
        let store = local_store();
        let a1 = store.save_assignment(draft_assignment("A1")).await.unwrap();
        let a2 = store.save_assignment(draft_assignment("A2")).await.unwrap();
        let s1 = store
            .submit_assignment(&a1.id, new_submission("student1"))
            .await
            .unwrap();
        let s2 = store
            .submit_assignment(&a2.id, new_submission("student2"))
            .await
            .unwrap();
        store
            .grade_submission(
                &s2.id,
                GradeSubmissionRequest {
                    grade: 92,
                    feedback: "great".to_string(),
                },
            )
            .await
            .unwrap();
        let a2_before = store.get_assignment_by_id(&a2.id).await.unwrap().unwrap();

        store
            .grade_submission(
                &s1.id,
                GradeSubmissionRequest {
                    grade: 78,
                    feedback: "ok".to_string(),
                },
            )
            .await
            .unwrap();

        let a1_after = store.get_assignment_by_id(&a1.id).await.unwrap().unwrap();
        let a2_after = store.get_assignment_by_id(&a2.id).await.unwrap().unwrap();
        assert_eq!(a1_after.status, AssignmentStatus::Graded);
        assert_eq!(a1_after.submissions[0].grade, Some(78));
        assert_eq!(a2_after, a2_before);
    }

    #[tokio::test]
    async fn test_appeal_requires_nonzero_grade() {
        let store = local_store();
        let assignment = store.save_assignment(draft_assignment("HW1")).await.unwrap();
        let submission = store
            .submit_assignment(&assignment.id, new_submission("student1"))
            .await
            .unwrap();

        // 未评分的提交不能申诉
        let err = store
            .submit_appeal(
                &submission.id,
                AppealRequest {
                    reason: "unfair".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E003");

        // 零分同样视为不可申诉
        store
            .grade_submission(
                &submission.id,
                GradeSubmissionRequest {
                    grade: 0,
                    feedback: "missing".to_string(),
                },
            )
            .await
            .unwrap();
        let err = store
            .submit_appeal(
                &submission.id,
                AppealRequest {
                    reason: "unfair".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E003");
    }

    #[tokio::test]
    async fn test_appeal_lifecycle() {
        let store = local_store();
        let assignment = store.save_assignment(draft_assignment("HW1")).await.unwrap();
        let submission = store
            .submit_assignment(&assignment.id, new_submission("student1"))
            .await
            .unwrap();
        store
            .grade_submission(
                &submission.id,
                GradeSubmissionRequest {
                    grade: 60,
                    feedback: "weak".to_string(),
                },
            )
            .await
            .unwrap();

        let appeal = store
            .submit_appeal(
                &submission.id,
                AppealRequest {
                    reason: "Question 3 was graded too harshly".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(appeal.status, AppealStatus::Pending);
        assert_eq!(appeal.original_grade, 60);
        let pending = store
            .get_assignment_by_id(&assignment.id)
            .await
            .unwrap()
            .unwrap();
        assert!(pending.has_appeal);

        let reviewed = store
            .review_appeal(
                &submission.id,
                ReviewAppealRequest {
                    grade: 75,
                    feedback: "Re-checked, partial credit granted".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(reviewed.grade, Some(75));
        let appeal = reviewed.appeal.unwrap();
        assert_eq!(appeal.status, AppealStatus::Reviewed);
        assert!(appeal.reviewed_at.is_some());
        assert_eq!(appeal.original_grade, 60);

        // 所有申诉均已复核，作业的申诉标记清除
        let closed = store
            .get_assignment_by_id(&assignment.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!closed.has_appeal);
    }

    #[tokio::test]
    async fn test_review_appeal_without_appeal() {
        let store = local_store();
        let assignment = store.save_assignment(draft_assignment("HW1")).await.unwrap();
        let submission = store
            .submit_assignment(&assignment.id, new_submission("student1"))
            .await
            .unwrap();

        let err = store
            .review_appeal(
                &submission.id,
                ReviewAppealRequest {
                    grade: 75,
                    feedback: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E003");
    }

    #[tokio::test]
    async fn test_initialize_if_empty_is_idempotent() {
        let store = local_store();
        store.initialize_if_empty().await.unwrap();
        let subjects = store.get_subjects().await.unwrap();
        assert_eq!(subjects.len(), 4);

        let saved = store.save_assignment(draft_assignment("extra")).await.unwrap();
        store.initialize_if_empty().await.unwrap();
        // 二次初始化不得覆盖已有数据
        assert!(store.get_assignment_by_id(&saved.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_initialize_keeps_writes_committed_before_seeding() {
        let store = local_store();
        // 科目集合为空时播种，已提交的作业也必须原样保留
        let saved = store.save_assignment(draft_assignment("early")).await.unwrap();
        store.initialize_if_empty().await.unwrap();

        assert_eq!(store.get_subjects().await.unwrap().len(), 4);
        let assignments = store.get_assignments().await.unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].id, saved.id);
    }

    #[tokio::test]
    async fn test_get_submissions_by_student() {
        let store = local_store();
        let a1 = store.save_assignment(draft_assignment("A1")).await.unwrap();
        let a2 = store.save_assignment(draft_assignment("A2")).await.unwrap();
        store
            .submit_assignment(&a1.id, new_submission("student1"))
            .await
            .unwrap();
        store
            .submit_assignment(&a2.id, new_submission("student1"))
            .await
            .unwrap();
        store
            .submit_assignment(&a2.id, new_submission("student2"))
            .await
            .unwrap();

        let submissions = store.get_submissions_by_student("student1").await.unwrap();
        assert_eq!(submissions.len(), 2);
        assert!(submissions.iter().all(|s| s.student_id == "student1"));
    }
}
