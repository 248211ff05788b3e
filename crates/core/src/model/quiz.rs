use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{CourseId, QuizId, SubmissionId, UserId};

/// Minimum score (percent) that counts as passing a quiz.
pub const PASS_MARK: u32 = 70;

/// Sentinel answer index sent for questions the learner never answered.
/// The backend grades it as wrong.
pub const NO_ANSWER: i32 = -1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("question text cannot be empty")]
    EmptyQuestion,

    #[error("question must offer at least two options")]
    TooFewOptions,
}

/// A single multiple-choice question. No answer key is present client-side;
/// grading happens on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
}

impl Question {
    /// Creates a question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyQuestion` for blank text and
    /// `QuizError::TooFewOptions` when fewer than two options are given.
    pub fn new(text: impl Into<String>, options: Vec<String>) -> Result<Self, QuizError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuizError::EmptyQuestion);
        }
        if options.len() < 2 {
            return Err(QuizError::TooFewOptions);
        }

        Ok(Self {
            text: text.trim().to_owned(),
            options,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

/// An ordered set of questions attached to a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    course_id: CourseId,
    title: String,
    questions: Vec<Question>,
}

impl Quiz {
    /// Creates a quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyTitle` if the title is blank.
    pub fn new(
        id: QuizId,
        course_id: CourseId,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }

        Ok(Self {
            id,
            course_id,
            title: title.trim().to_owned(),
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// A graded quiz submission as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubmission {
    id: SubmissionId,
    quiz_id: QuizId,
    user_id: UserId,
    score: u32,
    submitted_at: DateTime<Utc>,
}

impl QuizSubmission {
    #[must_use]
    pub fn new(
        id: SubmissionId,
        quiz_id: QuizId,
        user_id: UserId,
        score: u32,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            quiz_id,
            user_id,
            score,
            submitted_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// A score of exactly `PASS_MARK` counts as passing.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.score >= PASS_MARK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn submission(score: u32) -> QuizSubmission {
        QuizSubmission::new(
            SubmissionId::random(),
            QuizId::random(),
            UserId::random(),
            score,
            fixed_now(),
        )
    }

    #[test]
    fn pass_mark_is_inclusive() {
        assert!(submission(70).passed());
        assert!(!submission(69).passed());
        assert!(submission(100).passed());
    }

    #[test]
    fn question_requires_two_options() {
        let err = Question::new("Pick one", vec!["only".into()]).unwrap_err();
        assert_eq!(err, QuizError::TooFewOptions);
    }

    #[test]
    fn quiz_rejects_blank_title() {
        let err = Quiz::new(QuizId::random(), CourseId::random(), "  ", Vec::new()).unwrap_err();
        assert_eq!(err, QuizError::EmptyTitle);
    }
}
