//! Application services for the LMS client.
//!
//! Controllers here own screen-level state and orchestrate the backend:
//! [`AuthService`] for the session, [`CourseSession`] for an open course
//! with its debounced autosave, [`QuizAttempt`] for taking a quiz, and the
//! two dashboard read models.

#![forbid(unsafe_code)]

pub mod admin_dashboard;
pub mod auth;
pub mod autosave;
pub mod course_session;
pub mod error;
pub mod learner_dashboard;
pub mod quiz;

pub use admin_dashboard::AdminDashboard;
pub use auth::AuthService;
pub use autosave::{SaveDebouncer, SaveSequencer};
pub use course_session::CourseSession;
pub use error::ServiceError;
pub use learner_dashboard::LearnerDashboard;
pub use quiz::{AttemptState, QuizAttempt, QuizFlowError};
