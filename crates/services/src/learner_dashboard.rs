//! Read model for the learner's home screen.

use tracing::info;

use api::Backend;
use api::schema::{ProgressOverview, UserStats};
use lms_core::model::{Course, QuizSubmission, SubmissionId};

use crate::error::ServiceError;

/// Everything the learner dashboard renders, fetched in one shot.
pub struct LearnerDashboard {
    backend: Backend,
    courses: Vec<Course>,
    overview: Vec<ProgressOverview>,
    stats: UserStats,
    history: Vec<QuizSubmission>,
}

impl LearnerDashboard {
    /// Loads assigned courses, progress overview, quiz stats, and history
    /// concurrently. Any failure fails the whole load; the screen shows a
    /// retry state rather than partial data.
    ///
    /// # Errors
    ///
    /// Propagates the first backend failure.
    pub async fn load(backend: Backend) -> Result<Self, ServiceError> {
        let (courses, overview, stats, history) = tokio::try_join!(
            backend.courses.my_courses(),
            backend.progress.user_progress(),
            backend.quizzes.user_stats(),
            backend.quizzes.quiz_history(),
        )?;
        info!(
            courses = courses.len(),
            quizzes_taken = stats.quizzes_taken,
            "learner dashboard loaded"
        );
        Ok(Self {
            backend,
            courses,
            overview,
            stats,
            history,
        })
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn overview(&self) -> &[ProgressOverview] {
        &self.overview
    }

    #[must_use]
    pub fn stats(&self) -> UserStats {
        self.stats
    }

    #[must_use]
    pub fn history(&self) -> &[QuizSubmission] {
        &self.history
    }

    /// Count of assigned courses already completed.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.overview.iter().filter(|o| o.is_completed).count()
    }

    /// Full detail for one graded submission, fetched fresh for the
    /// results screen.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure, including `NotFound`.
    pub async fn submission_detail(
        &self,
        id: SubmissionId,
    ) -> Result<QuizSubmission, ServiceError> {
        Ok(self.backend.quizzes.quiz_result(id).await?)
    }

    /// The course to surface as "continue learning": the first assigned
    /// course that is not completed yet, preferring one already started.
    #[must_use]
    pub fn continue_learning(&self) -> Option<&Course> {
        let started = self
            .overview
            .iter()
            .find(|o| !o.is_completed && o.playback_position > 0.0);
        let target = started.or_else(|| self.overview.iter().find(|o| !o.is_completed))?;
        self.courses.iter().find(|c| c.id() == target.course_id)
    }
}
