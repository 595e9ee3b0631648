pub mod appeals;
pub mod assignments;
pub mod grading;
pub mod materials;
pub mod subjects;
pub mod submissions;

pub use appeals::entities::{Appeal, AppealStatus};
pub use assignments::entities::{Assignment, AssignmentStatus, AssignmentType};
pub use grading::responses::AiGradeResult;
pub use materials::entities::{Material, MaterialType};
pub use subjects::entities::Subject;
pub use submissions::entities::{Submission, SubmissionStatus};
pub use submissions::requests::{
    AppealRequest, GradeSubmissionRequest, NewSubmission, ReviewAppealRequest,
};
