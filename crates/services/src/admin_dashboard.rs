//! Read model and actions for the admin screen.
//!
//! Loads its tables concurrently, keeps them cached, and patches the cache
//! in place after each mutation so the screen stays consistent without a
//! full reload.

use tracing::info;

use api::Backend;
use api::schema::{
    AssignmentRequest, CourseDraft, CoursePatch, QuizGenParams, ResourceDraft, UserDetailedReport,
    UserPatch, UserReportItem,
};
use lms_core::Clock;
use lms_core::chart::{ChartBucket, Granularity, signup_series};
use lms_core::model::{Course, CourseId, Quiz, Resource, ResourceId, Role, User, UserId};

use crate::error::ServiceError;

pub struct AdminDashboard {
    backend: Backend,
    clock: Clock,
    users: Vec<User>,
    courses: Vec<Course>,
    reports: Vec<UserReportItem>,
    recent: Vec<User>,
}

impl AdminDashboard {
    /// Loads users, courses, reports, and recent signups concurrently.
    ///
    /// # Errors
    ///
    /// Propagates the first backend failure.
    pub async fn load(backend: Backend, clock: Clock) -> Result<Self, ServiceError> {
        let (users, courses, reports, recent) = tokio::try_join!(
            backend.admin.list_users(),
            backend.courses.list_courses(),
            backend.admin.admin_reports(),
            backend.admin.recent_activity(),
        )?;
        info!(
            users = users.len(),
            courses = courses.len(),
            "admin dashboard loaded"
        );
        Ok(Self {
            backend,
            clock,
            users,
            courses,
            reports,
            recent,
        })
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn reports(&self) -> &[UserReportItem] {
        &self.reports
    }

    #[must_use]
    pub fn recent_activity(&self) -> &[User] {
        &self.recent
    }

    #[must_use]
    pub fn learner_count(&self) -> usize {
        self.users.iter().filter(|u| u.role() == Role::Learner).count()
    }

    /// Signup chart series at the requested granularity, anchored at the
    /// dashboard clock's current time. Learners without a signup timestamp
    /// are left out of the chart.
    #[must_use]
    pub fn chart_data(&self, granularity: Granularity) -> Vec<ChartBucket> {
        let signups: Vec<_> = self
            .users
            .iter()
            .filter(|u| u.role() == Role::Learner)
            .filter_map(User::created_at)
            .collect();
        signup_series(&signups, granularity, self.clock.now())
    }

    // ── user management ──

    /// Applies a patch and refreshes the cached row.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; the cache is untouched on error.
    pub async fn update_user(&mut self, id: UserId, patch: &UserPatch) -> Result<User, ServiceError> {
        let updated = self.backend.admin.update_user(id, patch).await?;
        match self.users.iter_mut().find(|u| u.id() == id) {
            Some(slot) => *slot = updated.clone(),
            None => self.users.push(updated.clone()),
        }
        Ok(updated)
    }

    /// Deletes a user and drops them from every cached table.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn delete_user(&mut self, id: UserId) -> Result<User, ServiceError> {
        let removed = self.backend.admin.delete_user(id).await?;
        self.users.retain(|u| u.id() != id);
        self.recent.retain(|u| u.id() != id);
        self.reports.retain(|r| r.user_id != id);
        Ok(removed)
    }

    /// Assigns a course to a learner.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure, including the duplicate-assignment
    /// rejection.
    pub async fn assign_course(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<(), ServiceError> {
        let request = AssignmentRequest { user_id, course_id };
        self.backend.admin.assign_course(&request).await?;
        info!(%user_id, %course_id, "course assigned");
        Ok(())
    }

    /// Per-user drill-down report; always fetched fresh.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn user_report(&self, id: UserId) -> Result<UserDetailedReport, ServiceError> {
        Ok(self.backend.admin.user_report(id).await?)
    }

    // ── course management ──

    /// Creates a course and appends it to the cache.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn create_course(&mut self, draft: &CourseDraft) -> Result<Course, ServiceError> {
        let course = self.backend.courses.create_course(draft).await?;
        info!(course_id = %course.id(), "course created");
        self.courses.push(course.clone());
        Ok(course)
    }

    /// Updates a course and refreshes the cached row.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn update_course(
        &mut self,
        id: CourseId,
        patch: &CoursePatch,
    ) -> Result<Course, ServiceError> {
        let updated = self.backend.courses.update_course(id, patch).await?;
        match self.courses.iter_mut().find(|c| c.id() == id) {
            Some(slot) => *slot = updated.clone(),
            None => self.courses.push(updated.clone()),
        }
        Ok(updated)
    }

    /// Deletes a course and drops it from the cache.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn delete_course(&mut self, id: CourseId) -> Result<(), ServiceError> {
        self.backend.courses.delete_course(id).await?;
        self.courses.retain(|c| c.id() != id);
        Ok(())
    }

    /// Generates a quiz from the course video and caches it on the course.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn auto_generate_quiz(&mut self, id: CourseId) -> Result<Quiz, ServiceError> {
        let quiz = self.backend.courses.auto_generate_quiz(id).await?;
        info!(course_id = %id, quiz_id = %quiz.id(), "quiz generated from video");
        self.refresh_course(id).await;
        Ok(quiz)
    }

    /// Generates a quiz from an uploaded resource and caches it on the
    /// course.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn generate_quiz(
        &mut self,
        id: CourseId,
        params: &QuizGenParams,
    ) -> Result<Quiz, ServiceError> {
        let quiz = self.backend.courses.generate_quiz(id, params).await?;
        info!(course_id = %id, quiz_id = %quiz.id(), "quiz generated from resource");
        self.refresh_course(id).await;
        Ok(quiz)
    }

    // ── resource management ──

    /// Resources attached to a course, fetched fresh for the editor panel.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn list_resources(&self, id: CourseId) -> Result<Vec<Resource>, ServiceError> {
        Ok(self.backend.resources.list_resources(id).await?)
    }

    /// Attaches a resource to a course and refreshes the cached row.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn create_resource(
        &mut self,
        id: CourseId,
        draft: &ResourceDraft,
    ) -> Result<Resource, ServiceError> {
        let resource = self.backend.resources.create_resource(id, draft).await?;
        info!(course_id = %id, resource_id = %resource.id(), "resource attached");
        self.refresh_course(id).await;
        Ok(resource)
    }

    /// Detaches a resource and refreshes the cached course row.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure.
    pub async fn delete_resource(
        &mut self,
        course_id: CourseId,
        id: ResourceId,
    ) -> Result<(), ServiceError> {
        self.backend.resources.delete_resource(id).await?;
        self.refresh_course(course_id).await;
        Ok(())
    }

    /// Refetches one course so freshly attached quizzes show up with their
    /// questions; a failed refresh keeps the stale row.
    async fn refresh_course(&mut self, id: CourseId) {
        if let Ok(fresh) = self.backend.courses.get_course(id).await
            && let Some(slot) = self.courses.iter_mut().find(|c| c.id() == id)
        {
            *slot = fresh;
        }
    }
}
