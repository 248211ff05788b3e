mod course;
mod ids;
mod progress;
mod quiz;
mod resource;
mod user;

pub use ids::{CourseId, ParseIdError, QuizId, ResourceId, SubmissionId, UserId};

pub use course::{Course, CourseError};
pub use progress::{Progress, ProgressError};
pub use quiz::{NO_ANSWER, PASS_MARK, Question, Quiz, QuizError, QuizSubmission};
pub use resource::{Resource, ResourceError};
pub use user::{Role, User, UserError};
