//! 首次启动的示例数据
//!
//! 本地存储为空时由 `initialize_if_empty` 写入，便于离线演示。

use crate::models::{
    Assignment, AssignmentStatus, AssignmentType, Material, MaterialType, Subject, Submission,
    SubmissionStatus,
};

pub fn seed_subjects() -> Vec<Subject> {
    vec![
        Subject {
            id: "1".to_string(),
            title: "Introduction to Computer Science".to_string(),
            description: "Fundamental concepts of computer science and programming".to_string(),
            code: "CS101".to_string(),
            image_url: Some("/placeholder.svg".to_string()),
        },
        Subject {
            id: "2".to_string(),
            title: "Data Structures".to_string(),
            description: "Advanced data structures and algorithms".to_string(),
            code: "CS202".to_string(),
            image_url: Some("/placeholder.svg".to_string()),
        },
        Subject {
            id: "3".to_string(),
            title: "Web Development".to_string(),
            description: "Building modern web applications".to_string(),
            code: "CS303".to_string(),
            image_url: Some("/placeholder.svg".to_string()),
        },
        Subject {
            id: "4".to_string(),
            title: "Mathematics for Computer Science".to_string(),
            description: "Mathematical foundations for CS students".to_string(),
            code: "MATH215".to_string(),
            image_url: Some("/placeholder.svg".to_string()),
        },
    ]
}

pub fn seed_assignments() -> Vec<Assignment> {
    vec![
        Assignment {
            id: "1".to_string(),
            title: "Algorithm Analysis".to_string(),
            subject_id: "2".to_string(),
            description: "Analyze the time and space complexity of common algorithms".to_string(),
            due_date: "2023-12-15".to_string(),
            kind: AssignmentType::Homework,
            status: AssignmentStatus::Upcoming,
            max_grade: 100,
            criteria: Some("Correct analysis: 70%, Clarity: 30%".to_string()),
            appeal_deadline: None,
            has_appeal: false,
            submissions: vec![],
        },
        Assignment {
            id: "2".to_string(),
            title: "HTML/CSS Project".to_string(),
            subject_id: "3".to_string(),
            description: "Build a responsive website with HTML and CSS".to_string(),
            due_date: "2023-12-10".to_string(),
            kind: AssignmentType::Homework,
            status: AssignmentStatus::Graded,
            max_grade: 100,
            criteria: Some("Functionality: 40%, Design: 30%, Code quality: 30%".to_string()),
            appeal_deadline: Some("2023-12-15".to_string()),
            has_appeal: false,
            submissions: vec![Submission {
                id: "s1".to_string(),
                assignment_id: "2".to_string(),
                student_id: "student1".to_string(),
                student_name: "John Doe".to_string(),
                files: vec!["/placeholder.svg".to_string()],
                submitted_at: "2023-12-08".to_string(),
                status: SubmissionStatus::Graded,
                grade: Some(92),
                feedback: Some(
                    "Excellent work on the responsive design. Consider adding more accessibility features."
                        .to_string(),
                ),
                appeal: None,
            }],
        },
        Assignment {
            id: "3".to_string(),
            title: "Midterm Exam".to_string(),
            subject_id: "1".to_string(),
            description: "Covers topics from weeks 1-7".to_string(),
            due_date: "2023-11-05".to_string(),
            kind: AssignmentType::Exam,
            status: AssignmentStatus::Upcoming,
            max_grade: 100,
            criteria: None,
            appeal_deadline: None,
            has_appeal: false,
            submissions: vec![],
        },
    ]
}

pub fn seed_materials() -> Vec<Material> {
    vec![
        Material {
            id: "1".to_string(),
            title: "Introduction to Algorithms".to_string(),
            subject_id: "2".to_string(),
            description: "Slides covering basic algorithmic concepts".to_string(),
            kind: MaterialType::Presentation,
            file_url: "/placeholder.svg".to_string(),
            date_added: "2023-09-15".to_string(),
        },
        Material {
            id: "2".to_string(),
            title: "HTML Basics".to_string(),
            subject_id: "3".to_string(),
            description: "Guide to HTML elements and structure".to_string(),
            kind: MaterialType::Document,
            file_url: "/placeholder.svg".to_string(),
            date_added: "2023-09-10".to_string(),
        },
    ]
}
