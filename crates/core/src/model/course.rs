use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::CourseId;
use crate::model::quiz::Quiz;
use crate::model::resource::Resource;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course video url cannot be empty")]
    EmptyVideoUrl,
}

/// A course as served by the backend: metadata plus its ordered quizzes and
/// resources. The client holds a read-only cached copy per page visit.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: Option<String>,
    video_url: String,
    created_at: DateTime<Utc>,
    quizzes: Vec<Quiz>,
    resources: Vec<Resource>,
}

impl Course {
    /// Creates a course.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` or `CourseError::EmptyVideoUrl`
    /// for blank fields.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        video_url: impl Into<String>,
        created_at: DateTime<Utc>,
        quizzes: Vec<Quiz>,
        resources: Vec<Resource>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        let video_url = video_url.into();
        if video_url.trim().is_empty() {
            return Err(CourseError::EmptyVideoUrl);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description,
            video_url: video_url.trim().to_owned(),
            created_at,
            quizzes,
            resources,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Looks up one of the course's quizzes by ID.
    #[must_use]
    pub fn quiz(&self, id: crate::model::ids::QuizId) -> Option<&Quiz> {
        self.quizzes.iter().find(|quiz| quiz.id() == id)
    }
}
