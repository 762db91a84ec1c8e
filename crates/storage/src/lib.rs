#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    GroupRepository, IN_QUERY_BATCH_LIMIT, InMemoryRepository, LessonRepository,
    MEMBERSHIP_BATCH_LIMIT, Storage, StorageError, StudentRepository, SubmissionRepository,
};
