//! Wire shapes for every backend endpoint.
//!
//! Responses are decoded into explicit records and then validated into the
//! domain types from `lms-core`, so malformed payloads fail loudly at this
//! boundary instead of flowing into controllers. Requests are plain
//! serializable structs mirroring what the backend expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lms_core::model::{
    Course, CourseId, Progress, Question, Quiz, QuizId, QuizSubmission, Resource, ResourceId, Role,
    SubmissionId, User, UserId,
};

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
}

/// Body for course creation.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub video_url: String,
}

/// Partial course update; absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Full progress state; every save sends all three fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub is_completed: bool,
    pub notes: String,
    pub playback_position: f64,
}

impl From<&Progress> for ProgressUpdate {
    fn from(progress: &Progress) -> Self {
        Self {
            is_completed: progress.is_completed(),
            notes: progress.notes().to_owned(),
            playback_position: progress.playback_position(),
        }
    }
}

/// One answer index per question, in question order; unanswered questions
/// carry the `NO_ANSWER` sentinel.
#[derive(Debug, Clone, Serialize)]
pub struct QuizSubmitRequest {
    pub quiz_id: QuizId,
    pub answers: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceDraft {
    pub file_name: String,
    pub file_size: String,
    pub file_url: String,
}

/// Partial user update from the admin user table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRequest {
    pub user_id: UserId,
    pub course_id: CourseId,
}

/// Query parameters for AI quiz generation from a resource.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuizGenParams {
    pub resource_id: ResourceId,
    pub num_questions: u32,
}

//
// ─── RESPONSES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Validates the record into a domain `User`.
    ///
    /// # Errors
    ///
    /// Returns `lms_core::Error` if the backend sent blank identity fields.
    pub fn into_user(self) -> Result<User, lms_core::Error> {
        Ok(User::new(
            self.id,
            self.email,
            self.full_name,
            self.role,
            self.is_active,
            self.created_at,
        )?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: UserRecord,
}

/// Outcome of a successful login, already validated.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizRecord {
    pub id: QuizId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

impl QuizRecord {
    /// Validates the record into a domain `Quiz`.
    ///
    /// # Errors
    ///
    /// Returns `lms_core::Error` for blank titles or degenerate questions.
    pub fn into_quiz(self) -> Result<Quiz, lms_core::Error> {
        let questions = self
            .questions
            .into_iter()
            .map(|q| Question::new(q.question, q.options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Quiz::new(self.id, self.course_id, self.title, questions)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRecord {
    pub id: ResourceId,
    pub course_id: CourseId,
    pub file_name: String,
    #[serde(default)]
    pub file_size: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

impl ResourceRecord {
    /// Validates the record into a domain `Resource`.
    ///
    /// # Errors
    ///
    /// Returns `lms_core::Error` for blank file names or URLs.
    pub fn into_resource(self) -> Result<Resource, lms_core::Error> {
        Ok(Resource::new(
            self.id,
            self.course_id,
            self.file_name,
            self.file_size,
            self.file_url,
            self.created_at,
        )?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseRecord {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub video_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub quizzes: Vec<QuizRecord>,
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
}

impl CourseRecord {
    /// Validates the record into a domain `Course`.
    ///
    /// # Errors
    ///
    /// Returns `lms_core::Error` if the course or any nested quiz/resource
    /// fails validation.
    pub fn into_course(self) -> Result<Course, lms_core::Error> {
        let quizzes = self
            .quizzes
            .into_iter()
            .map(QuizRecord::into_quiz)
            .collect::<Result<Vec<_>, _>>()?;
        let resources = self
            .resources
            .into_iter()
            .map(ResourceRecord::into_resource)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Course::new(
            self.id,
            self.title,
            self.description,
            self.video_url,
            self.created_at,
            quizzes,
            resources,
        )?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressRecord {
    pub is_completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub playback_position: f64,
}

impl ProgressRecord {
    /// Validates the record into a domain `Progress`.
    ///
    /// # Errors
    ///
    /// Returns `lms_core::Error` for an out-of-range playback fraction.
    pub fn into_progress(self) -> Result<Progress, lms_core::Error> {
        Ok(Progress::from_persisted(
            self.is_completed,
            self.notes.unwrap_or_default(),
            self.playback_position,
        )?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub quiz_id: QuizId,
    pub user_id: UserId,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    #[must_use]
    pub fn into_submission(self) -> QuizSubmission {
        QuizSubmission::new(
            self.id,
            self.quiz_id,
            self.user_id,
            self.score,
            self.submitted_at,
        )
    }
}

/// Aggregate quiz performance for the signed-in learner.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct UserStats {
    pub average_score: f64,
    pub quizzes_taken: u32,
}

/// One row of the admin report table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserReportItem {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub courses_enrolled: u32,
    pub courses_completed: u32,
    pub completion_percentage: f64,
}

/// Per-course drill-down inside a user's detailed report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseProgressReport {
    pub course_id: CourseId,
    pub course_title: String,
    pub video_status: String,
    #[serde(default)]
    pub quiz_score: Option<u32>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserDetailedReport {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub courses: Vec<CourseProgressReport>,
}

/// One row of the learner's own progress overview.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressOverview {
    pub course_id: CourseId,
    pub course_title: String,
    pub is_completed: bool,
    pub playback_position: f64,
}
