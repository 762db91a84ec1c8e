use thiserror::Error;

use crate::model::{GroupError, ParseIdError, SubmissionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
