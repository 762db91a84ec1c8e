mod group;
mod ids;
mod lesson;
mod student;
mod submission;

pub use ids::{GroupId, LessonId, ParseIdError, ProfessorId, StudentId, SubmissionId};

pub use group::{Group, GroupError};
pub use lesson::Lesson;
pub use student::{Student, UNKNOWN_STUDENT_NAME};
pub use submission::{Submission, SubmissionError, SubmissionKind};
