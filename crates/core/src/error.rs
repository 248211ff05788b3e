use thiserror::Error;

use crate::model::{CourseError, ProgressError, QuizError, ResourceError, UserError};

/// Umbrella error for model validation, mostly useful at the API boundary
/// where several record types are decoded in one pass.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    User(#[from] UserError),
}
