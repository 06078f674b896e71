pub mod assignment;
pub mod course;
pub mod lecture;
pub mod message;
pub mod user;

pub use assignment::{
    Assignment, AssignmentWithStatus, CreateAssignmentRequest, SubmitRequest, Submission,
};
pub use course::{Course, CreateCourseRequest, Enrollment, UpdateCourseRequest};
pub use lecture::{CreateLectureRequest, Lecture};
pub use message::{CreateMessageRequest, Message};
pub use user::{User, UserResponse, UserRole};
