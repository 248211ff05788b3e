//! Shared error type for the services crate.

use api::ApiError;
use lms_core::model::QuizId;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The course itself could not be fetched. Unlike progress or resource
    /// failures, there is nothing sensible to show without it.
    #[error("course could not be loaded")]
    CourseUnavailable(#[source] ApiError),

    /// The quiz does not belong to the loaded course.
    #[error("quiz {0} is not part of this course")]
    UnknownQuiz(QuizId),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Domain(#[from] lms_core::Error),
}
