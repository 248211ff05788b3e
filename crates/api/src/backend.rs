//! Backend contracts and the in-memory double used by service tests.
//!
//! Each concern gets its own trait so controllers depend only on what they
//! touch; `Backend` aggregates them behind trait objects, mirroring how the
//! HTTP client implements all of them against one base URL.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use lms_core::Clock;
use lms_core::model::{
    Course, CourseId, Progress, Question, Quiz, QuizId, QuizSubmission, Resource, ResourceId, Role,
    SubmissionId, User, UserId,
};

use crate::error::ApiError;
use crate::schema::{
    AssignmentRequest, CourseDraft, CoursePatch, CourseProgressReport, LoginOutcome, LoginRequest,
    ProgressOverview, ProgressUpdate, QuizGenParams, QuizSubmitRequest, ResourceDraft,
    SignupRequest, UserDetailedReport, UserPatch, UserReportItem, UserStats,
};

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a bearer token and the user's identity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for rejected credentials.
    async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, ApiError>;

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for duplicate emails or validation failures.
    async fn signup(&self, request: &SignupRequest) -> Result<User, ApiError>;
}

#[async_trait]
pub trait CourseApi: Send + Sync {
    /// All courses visible to the caller (role-scoped server-side).
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError>;

    /// Courses assigned to the signed-in learner.
    async fn my_courses(&self) -> Result<Vec<Course>, ApiError>;

    /// Full course detail including quizzes and resources.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown IDs.
    async fn get_course(&self, id: CourseId) -> Result<Course, ApiError>;

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, ApiError>;

    async fn update_course(&self, id: CourseId, patch: &CoursePatch) -> Result<Course, ApiError>;

    async fn delete_course(&self, id: CourseId) -> Result<(), ApiError>;

    /// Asks the backend to generate a quiz from the course's video. Opaque
    /// AI work; the client only receives the finished quiz.
    async fn auto_generate_quiz(&self, id: CourseId) -> Result<Quiz, ApiError>;

    /// Asks the backend to generate a quiz from an uploaded resource.
    async fn generate_quiz(&self, id: CourseId, params: &QuizGenParams) -> Result<Quiz, ApiError>;
}

#[async_trait]
pub trait ProgressApi: Send + Sync {
    /// Saved progress for a course; `None` means "not started yet", which is
    /// a normal empty state rather than an error.
    async fn get_progress(&self, course_id: CourseId) -> Result<Option<Progress>, ApiError>;

    /// Upserts the full progress state and returns the server's echo.
    async fn put_progress(
        &self,
        course_id: CourseId,
        update: &ProgressUpdate,
    ) -> Result<Progress, ApiError>;

    /// Per-course overview for the signed-in learner.
    async fn user_progress(&self) -> Result<Vec<ProgressOverview>, ApiError>;
}

#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Submits answers for grading; the returned record carries the score.
    async fn submit_quiz(&self, request: &QuizSubmitRequest) -> Result<QuizSubmission, ApiError>;

    /// Past submissions for the signed-in learner, newest first.
    async fn quiz_history(&self) -> Result<Vec<QuizSubmission>, ApiError>;

    /// A single graded submission.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown IDs.
    async fn quiz_result(&self, id: SubmissionId) -> Result<QuizSubmission, ApiError>;

    /// Aggregate quiz stats for the signed-in learner.
    async fn user_stats(&self) -> Result<UserStats, ApiError>;
}

#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn list_resources(&self, course_id: CourseId) -> Result<Vec<Resource>, ApiError>;

    async fn create_resource(
        &self,
        course_id: CourseId,
        draft: &ResourceDraft,
    ) -> Result<Resource, ApiError>;

    async fn delete_resource(&self, id: ResourceId) -> Result<(), ApiError>;
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<User, ApiError>;

    /// Deletes a user and returns the removed record.
    async fn delete_user(&self, id: UserId) -> Result<User, ApiError>;

    /// Assigns a course to a learner.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the assignment already exists.
    async fn assign_course(&self, request: &AssignmentRequest) -> Result<(), ApiError>;

    async fn admin_reports(&self) -> Result<Vec<UserReportItem>, ApiError>;

    async fn user_report(&self, id: UserId) -> Result<UserDetailedReport, ApiError>;

    /// Most recent learner signups.
    async fn recent_activity(&self) -> Result<Vec<User>, ApiError>;
}

/// Aggregates every backend concern behind trait objects so controllers can
/// be handed one value and tests can swap in the in-memory double.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthApi>,
    pub courses: Arc<dyn CourseApi>,
    pub progress: Arc<dyn ProgressApi>,
    pub quizzes: Arc<dyn QuizApi>,
    pub resources: Arc<dyn ResourceApi>,
    pub admin: Arc<dyn AdminApi>,
}

impl Backend {
    /// Backend served entirely from process memory, for tests and demos.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_double(InMemoryBackend::new())
    }

    /// Wraps an existing double so tests can keep a handle for seeding and
    /// instrumentation.
    #[must_use]
    pub fn from_double(double: InMemoryBackend) -> Self {
        Self {
            auth: Arc::new(double.clone()),
            courses: Arc::new(double.clone()),
            progress: Arc::new(double.clone()),
            quizzes: Arc::new(double.clone()),
            resources: Arc::new(double.clone()),
            admin: Arc::new(double),
        }
    }
}

//
// ─── IN-MEMORY DOUBLE ──────────────────────────────────────────────────────────
//

struct InMemoryState {
    users: Vec<User>,
    passwords: HashMap<String, String>,
    courses: Vec<Course>,
    assignments: Vec<(UserId, CourseId)>,
    progress: HashMap<CourseId, Progress>,
    submissions: Vec<QuizSubmission>,
    answer_keys: HashMap<QuizId, Vec<i32>>,
    active_user: UserId,
    fail_next_submit: bool,
}

/// Single-tenant stand-in for the remote API.
///
/// Progress is keyed by course only: the double models one signed-in
/// learner (`active_user`), which is all the controllers ever see.
#[derive(Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<InMemoryState>>,
    progress_puts: Arc<AtomicUsize>,
    clock: Clock,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState {
                users: Vec::new(),
                passwords: HashMap::new(),
                courses: Vec::new(),
                assignments: Vec::new(),
                progress: HashMap::new(),
                submissions: Vec::new(),
                answer_keys: HashMap::new(),
                active_user: UserId::random(),
                fail_next_submit: false,
            })),
            progress_puts: Arc::new(AtomicUsize::new(0)),
            clock: Clock::system(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── seeding / instrumentation ──

    pub fn seed_user(&self, user: User, password: &str) {
        let mut state = self.lock();
        state.passwords.insert(user.email().to_owned(), password.to_owned());
        state.users.push(user);
    }

    pub fn seed_course(&self, course: Course) {
        self.lock().courses.push(course);
    }

    pub fn seed_assignment(&self, user_id: UserId, course_id: CourseId) {
        self.lock().assignments.push((user_id, course_id));
    }

    /// Correct option index per question, used to grade submissions.
    pub fn set_answer_key(&self, quiz_id: QuizId, key: Vec<i32>) {
        self.lock().answer_keys.insert(quiz_id, key);
    }

    /// Identity that progress and submissions are attributed to.
    pub fn set_active_user(&self, id: UserId) {
        self.lock().active_user = id;
    }

    /// Makes the next `submit_quiz` call fail with a transport error.
    pub fn fail_next_submit(&self) {
        self.lock().fail_next_submit = true;
    }

    /// Number of `put_progress` calls observed, for debounce assertions.
    #[must_use]
    pub fn progress_put_count(&self) -> usize {
        self.progress_puts.load(Ordering::SeqCst)
    }

    /// Currently stored progress for a course, if any.
    #[must_use]
    pub fn stored_progress(&self, course_id: CourseId) -> Option<Progress> {
        self.lock().progress.get(&course_id).cloned()
    }

    fn find_course(state: &InMemoryState, id: CourseId) -> Result<Course, ApiError> {
        state
            .courses
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    fn generated_quiz(
        course_id: CourseId,
        title: &str,
        questions: u32,
    ) -> Result<Quiz, lms_core::Error> {
        let questions = (0..questions.max(1))
            .map(|i| {
                Question::new(
                    format!("Generated question {}", i + 1),
                    vec!["Option A".into(), "Option B".into()],
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Quiz::new(QuizId::random(), course_id, title, questions)?)
    }

    fn append_generated_quiz(
        &self,
        course_id: CourseId,
        title: &str,
        count: u32,
    ) -> Result<Quiz, ApiError> {
        let mut state = self.lock();
        let course = Self::find_course(&state, course_id)?;
        let quiz = Self::generated_quiz(course_id, title, count)?;
        let mut quizzes = course.quizzes().to_vec();
        quizzes.push(quiz.clone());
        let rebuilt = rebuild_course(&course, None, None, None, Some(quizzes), None)?;
        replace_course(&mut state, rebuilt);
        state
            .answer_keys
            .insert(quiz.id(), vec![0; quiz.question_count()]);
        Ok(quiz)
    }
}

fn rebuild_course(
    course: &Course,
    title: Option<String>,
    description: Option<Option<String>>,
    video_url: Option<String>,
    quizzes: Option<Vec<Quiz>>,
    resources: Option<Vec<Resource>>,
) -> Result<Course, lms_core::Error> {
    Ok(Course::new(
        course.id(),
        title.unwrap_or_else(|| course.title().to_owned()),
        description.unwrap_or_else(|| course.description().map(str::to_owned)),
        video_url.unwrap_or_else(|| course.video_url().to_owned()),
        course.created_at(),
        quizzes.unwrap_or_else(|| course.quizzes().to_vec()),
        resources.unwrap_or_else(|| course.resources().to_vec()),
    )?)
}

fn replace_course(state: &mut InMemoryState, course: Course) {
    if let Some(slot) = state.courses.iter_mut().find(|c| c.id() == course.id()) {
        *slot = course;
    }
}

fn video_status(progress: Option<&Progress>) -> &'static str {
    match progress {
        None => "Not Started",
        Some(p) if p.is_completed() => "Completed",
        Some(p) if p.has_started_video() => "Started",
        Some(_) => "Not Started",
    }
}

#[async_trait]
impl AuthApi for InMemoryBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, ApiError> {
        let mut state = self.lock();
        let matches = state
            .passwords
            .get(&request.email)
            .is_some_and(|stored| stored == &request.password);
        if !matches {
            return Err(ApiError::Status {
                status: 400,
                detail: "Incorrect email or password".into(),
            });
        }
        let user = state
            .users
            .iter()
            .find(|u| u.email() == request.email)
            .cloned()
            .ok_or(ApiError::NotFound)?;
        state.active_user = user.id();
        Ok(LoginOutcome {
            access_token: format!("test-token-{}", user.id()),
            user,
        })
    }

    async fn signup(&self, request: &SignupRequest) -> Result<User, ApiError> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.email() == request.email) {
            return Err(ApiError::Status {
                status: 400,
                detail: "Email already registered".into(),
            });
        }
        let user = User::new(
            UserId::random(),
            request.email.clone(),
            request.full_name.clone(),
            request.role,
            true,
            Some(self.clock.now()),
        )
        .map_err(lms_core::Error::from)?;
        state
            .passwords
            .insert(request.email.clone(), request.password.clone());
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl CourseApi for InMemoryBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        Ok(self.lock().courses.clone())
    }

    async fn my_courses(&self) -> Result<Vec<Course>, ApiError> {
        let state = self.lock();
        let assigned: Vec<CourseId> = state
            .assignments
            .iter()
            .filter(|(user, _)| *user == state.active_user)
            .map(|(_, course)| *course)
            .collect();
        Ok(state
            .courses
            .iter()
            .filter(|c| assigned.contains(&c.id()))
            .cloned()
            .collect())
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, ApiError> {
        Self::find_course(&self.lock(), id)
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, ApiError> {
        let course = Course::new(
            CourseId::random(),
            draft.title.clone(),
            draft.description.clone(),
            draft.video_url.clone(),
            self.clock.now(),
            Vec::new(),
            Vec::new(),
        )
        .map_err(lms_core::Error::from)?;
        self.lock().courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: CourseId, patch: &CoursePatch) -> Result<Course, ApiError> {
        let mut state = self.lock();
        let course = Self::find_course(&state, id)?;
        let rebuilt = rebuild_course(
            &course,
            patch.title.clone(),
            patch.description.clone().map(Some),
            patch.video_url.clone(),
            None,
            None,
        )?;
        replace_course(&mut state, rebuilt.clone());
        Ok(rebuilt)
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), ApiError> {
        let mut state = self.lock();
        let before = state.courses.len();
        state.courses.retain(|c| c.id() != id);
        if state.courses.len() == before {
            return Err(ApiError::NotFound);
        }
        state.assignments.retain(|(_, course)| *course != id);
        state.progress.remove(&id);
        Ok(())
    }

    async fn auto_generate_quiz(&self, id: CourseId) -> Result<Quiz, ApiError> {
        self.append_generated_quiz(id, "Auto-generated Quiz", 3)
    }

    async fn generate_quiz(&self, id: CourseId, params: &QuizGenParams) -> Result<Quiz, ApiError> {
        self.append_generated_quiz(id, "Resource Quiz", params.num_questions)
    }
}

#[async_trait]
impl ProgressApi for InMemoryBackend {
    async fn get_progress(&self, course_id: CourseId) -> Result<Option<Progress>, ApiError> {
        Ok(self.lock().progress.get(&course_id).cloned())
    }

    async fn put_progress(
        &self,
        course_id: CourseId,
        update: &ProgressUpdate,
    ) -> Result<Progress, ApiError> {
        self.progress_puts.fetch_add(1, Ordering::SeqCst);
        let progress = Progress::from_persisted(
            update.is_completed,
            update.notes.clone(),
            update.playback_position,
        )
        .map_err(lms_core::Error::from)?;
        self.lock().progress.insert(course_id, progress.clone());
        Ok(progress)
    }

    async fn user_progress(&self) -> Result<Vec<ProgressOverview>, ApiError> {
        let state = self.lock();
        Ok(state
            .assignments
            .iter()
            .filter(|(user, _)| *user == state.active_user)
            .filter_map(|(_, course_id)| {
                let course = state.courses.iter().find(|c| c.id() == *course_id)?;
                let progress = state.progress.get(course_id);
                Some(ProgressOverview {
                    course_id: *course_id,
                    course_title: course.title().to_owned(),
                    is_completed: progress.is_some_and(Progress::is_completed),
                    playback_position: progress.map_or(0.0, Progress::playback_position),
                })
            })
            .collect())
    }
}

#[async_trait]
impl QuizApi for InMemoryBackend {
    async fn submit_quiz(&self, request: &QuizSubmitRequest) -> Result<QuizSubmission, ApiError> {
        let mut state = self.lock();
        if state.fail_next_submit {
            state.fail_next_submit = false;
            return Err(ApiError::Transport("connection reset".into()));
        }

        let key = state
            .answer_keys
            .get(&request.quiz_id)
            .cloned()
            .unwrap_or_default();
        let total = request.answers.len().max(1);
        let correct = request
            .answers
            .iter()
            .zip(key.iter())
            .filter(|(given, expected)| given == expected)
            .count();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let score = ((correct as f64 / total as f64) * 100.0).round() as u32;

        let submission = QuizSubmission::new(
            SubmissionId::random(),
            request.quiz_id,
            state.active_user,
            score,
            self.clock.now(),
        );
        state.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn quiz_history(&self) -> Result<Vec<QuizSubmission>, ApiError> {
        let state = self.lock();
        let mut history: Vec<QuizSubmission> = state
            .submissions
            .iter()
            .filter(|s| s.user_id() == state.active_user)
            .cloned()
            .collect();
        history.sort_by_key(|s| std::cmp::Reverse(s.submitted_at()));
        Ok(history)
    }

    async fn quiz_result(&self, id: SubmissionId) -> Result<QuizSubmission, ApiError> {
        self.lock()
            .submissions
            .iter()
            .find(|s| s.id() == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn user_stats(&self) -> Result<UserStats, ApiError> {
        let state = self.lock();
        let scores: Vec<u32> = state
            .submissions
            .iter()
            .filter(|s| s.user_id() == state.active_user)
            .map(QuizSubmission::score)
            .collect();
        if scores.is_empty() {
            return Ok(UserStats {
                average_score: 0.0,
                quizzes_taken: 0,
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let taken = scores.len() as u32;
        let average = f64::from(scores.iter().sum::<u32>()) / f64::from(taken);
        Ok(UserStats {
            average_score: (average * 10.0).round() / 10.0,
            quizzes_taken: taken,
        })
    }
}

#[async_trait]
impl ResourceApi for InMemoryBackend {
    async fn list_resources(&self, course_id: CourseId) -> Result<Vec<Resource>, ApiError> {
        let state = self.lock();
        let course = Self::find_course(&state, course_id)?;
        Ok(course.resources().to_vec())
    }

    async fn create_resource(
        &self,
        course_id: CourseId,
        draft: &ResourceDraft,
    ) -> Result<Resource, ApiError> {
        let mut state = self.lock();
        let course = Self::find_course(&state, course_id)?;
        let resource = Resource::new(
            ResourceId::random(),
            course_id,
            draft.file_name.clone(),
            draft.file_size.clone(),
            draft.file_url.clone(),
            self.clock.now(),
        )
        .map_err(lms_core::Error::from)?;
        let mut resources = course.resources().to_vec();
        resources.push(resource.clone());
        let rebuilt = rebuild_course(&course, None, None, None, None, Some(resources))?;
        replace_course(&mut state, rebuilt);
        Ok(resource)
    }

    async fn delete_resource(&self, id: ResourceId) -> Result<(), ApiError> {
        let mut state = self.lock();
        let owner = state
            .courses
            .iter()
            .find(|c| c.resources().iter().any(|r| r.id() == id))
            .cloned()
            .ok_or(ApiError::NotFound)?;
        let resources = owner
            .resources()
            .iter()
            .filter(|r| r.id() != id)
            .cloned()
            .collect();
        let rebuilt = rebuild_course(&owner, None, None, None, None, Some(resources))?;
        replace_course(&mut state, rebuilt);
        Ok(())
    }
}

#[async_trait]
impl AdminApi for InMemoryBackend {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.lock().users.clone())
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<User, ApiError> {
        let mut state = self.lock();
        let user = state
            .users
            .iter()
            .find(|u| u.id() == id)
            .cloned()
            .ok_or(ApiError::NotFound)?;
        let updated = User::new(
            user.id(),
            patch.email.clone().unwrap_or_else(|| user.email().to_owned()),
            patch
                .full_name
                .clone()
                .unwrap_or_else(|| user.full_name().to_owned()),
            patch.role.unwrap_or(user.role()),
            patch.is_active.unwrap_or(user.is_active()),
            user.created_at(),
        )
        .map_err(lms_core::Error::from)?;
        if let Some(slot) = state.users.iter_mut().find(|u| u.id() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> Result<User, ApiError> {
        let mut state = self.lock();
        let position = state
            .users
            .iter()
            .position(|u| u.id() == id)
            .ok_or(ApiError::NotFound)?;
        let removed = state.users.remove(position);
        state.assignments.retain(|(user, _)| *user != id);
        Ok(removed)
    }

    async fn assign_course(&self, request: &AssignmentRequest) -> Result<(), ApiError> {
        let mut state = self.lock();
        let pair = (request.user_id, request.course_id);
        if state.assignments.contains(&pair) {
            return Err(ApiError::Status {
                status: 400,
                detail: "Course already assigned to this user".into(),
            });
        }
        state.assignments.push(pair);
        Ok(())
    }

    async fn admin_reports(&self) -> Result<Vec<UserReportItem>, ApiError> {
        let state = self.lock();
        Ok(state
            .users
            .iter()
            .filter(|u| u.role() == Role::Learner)
            .map(|user| {
                let assigned: Vec<CourseId> = state
                    .assignments
                    .iter()
                    .filter(|(id, _)| *id == user.id())
                    .map(|(_, course)| *course)
                    .collect();
                let completed = assigned
                    .iter()
                    .filter(|course| {
                        state
                            .progress
                            .get(course)
                            .is_some_and(Progress::is_completed)
                    })
                    .count();
                #[allow(clippy::cast_possible_truncation)]
                let enrolled = assigned.len() as u32;
                #[allow(clippy::cast_possible_truncation)]
                let completed = completed as u32;
                let percentage = if enrolled == 0 {
                    0.0
                } else {
                    f64::from(completed) / f64::from(enrolled) * 100.0
                };
                UserReportItem {
                    user_id: user.id(),
                    full_name: user.full_name().to_owned(),
                    email: user.email().to_owned(),
                    courses_enrolled: enrolled,
                    courses_completed: completed,
                    completion_percentage: percentage,
                }
            })
            .collect())
    }

    async fn user_report(&self, id: UserId) -> Result<UserDetailedReport, ApiError> {
        let state = self.lock();
        let user = state
            .users
            .iter()
            .find(|u| u.id() == id)
            .ok_or(ApiError::NotFound)?;
        let courses = state
            .assignments
            .iter()
            .filter(|(user_id, _)| *user_id == id)
            .filter_map(|(_, course_id)| {
                let course = state.courses.iter().find(|c| c.id() == *course_id)?;
                let progress = state.progress.get(course_id);
                let quiz_score = state
                    .submissions
                    .iter()
                    .filter(|s| course.quizzes().iter().any(|q| q.id() == s.quiz_id()))
                    .map(QuizSubmission::score)
                    .max();
                Some(CourseProgressReport {
                    course_id: *course_id,
                    course_title: course.title().to_owned(),
                    video_status: video_status(progress).to_owned(),
                    quiz_score,
                    is_completed: progress.is_some_and(Progress::is_completed),
                })
            })
            .collect();
        Ok(UserDetailedReport {
            user_id: user.id(),
            full_name: user.full_name().to_owned(),
            email: user.email().to_owned(),
            courses,
        })
    }

    async fn recent_activity(&self) -> Result<Vec<User>, ApiError> {
        let state = self.lock();
        let mut learners: Vec<User> = state
            .users
            .iter()
            .filter(|u| u.role() == Role::Learner)
            .cloned()
            .collect();
        learners.sort_by_key(|u| std::cmp::Reverse(u.created_at()));
        learners.truncate(5);
        Ok(learners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::time::{fixed_clock, fixed_now};

    fn learner(email: &str) -> User {
        User::new(
            UserId::random(),
            email,
            "Test Learner",
            Role::Learner,
            true,
            Some(fixed_now()),
        )
        .unwrap()
    }

    fn course_with_quiz() -> (Course, QuizId) {
        let course_id = CourseId::random();
        let quiz = Quiz::new(
            QuizId::random(),
            course_id,
            "Checkpoint",
            vec![
                Question::new("Q1", vec!["a".into(), "b".into()]).unwrap(),
                Question::new("Q2", vec!["a".into(), "b".into()]).unwrap(),
            ],
        )
        .unwrap();
        let quiz_id = quiz.id();
        let course = Course::new(
            course_id,
            "Intro",
            None,
            "https://youtu.be/dQw4w9WgXcQ",
            fixed_now(),
            vec![quiz],
            Vec::new(),
        )
        .unwrap();
        (course, quiz_id)
    }

    #[tokio::test]
    async fn login_round_trip_sets_active_user() {
        let double = InMemoryBackend::new().with_clock(fixed_clock());
        let user = learner("ada@example.com");
        double.seed_user(user.clone(), "hunter2");

        let outcome = double
            .login(&LoginRequest {
                email: "ada@example.com".into(),
                password: "hunter2".into(),
            })
            .await
            .unwrap();
        assert_eq!(outcome.user.id(), user.id());
        assert!(!outcome.access_token.is_empty());

        let err = double
            .login(&LoginRequest {
                email: "ada@example.com".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn progress_round_trips_and_counts_puts() {
        let double = InMemoryBackend::new().with_clock(fixed_clock());
        let (course, _) = course_with_quiz();
        let course_id = course.id();
        double.seed_course(course);

        assert_eq!(double.get_progress(course_id).await.unwrap(), None);

        let update = ProgressUpdate {
            is_completed: false,
            notes: "notes".into(),
            playback_position: 0.4,
        };
        let echo = double.put_progress(course_id, &update).await.unwrap();
        assert_eq!(echo.notes(), "notes");
        assert_eq!(double.progress_put_count(), 1);
        assert!(double.get_progress(course_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn submit_quiz_grades_against_answer_key() {
        let double = InMemoryBackend::new().with_clock(fixed_clock());
        let (course, quiz_id) = course_with_quiz();
        double.seed_course(course);
        double.set_answer_key(quiz_id, vec![1, 0]);

        let submission = double
            .submit_quiz(&QuizSubmitRequest {
                quiz_id,
                answers: vec![1, 1],
            })
            .await
            .unwrap();
        assert_eq!(submission.score(), 50);

        let history = double.quiz_history().await.unwrap();
        assert_eq!(history.len(), 1);
        let fetched = double.quiz_result(submission.id()).await.unwrap();
        assert_eq!(fetched.score(), 50);
    }

    #[tokio::test]
    async fn fail_next_submit_is_one_shot() {
        let double = InMemoryBackend::new().with_clock(fixed_clock());
        let (course, quiz_id) = course_with_quiz();
        double.seed_course(course);
        double.fail_next_submit();

        let request = QuizSubmitRequest {
            quiz_id,
            answers: vec![0, 0],
        };
        assert!(matches!(
            double.submit_quiz(&request).await.unwrap_err(),
            ApiError::Transport(_)
        ));
        assert!(double.submit_quiz(&request).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_assignment_is_rejected() {
        let double = InMemoryBackend::new();
        let user = learner("ada@example.com");
        let (course, _) = course_with_quiz();
        let request = AssignmentRequest {
            user_id: user.id(),
            course_id: course.id(),
        };
        double.seed_user(user, "pw");
        double.seed_course(course);

        double.assign_course(&request).await.unwrap();
        assert!(matches!(
            double.assign_course(&request).await.unwrap_err(),
            ApiError::Status { status: 400, .. }
        ));
    }

    #[tokio::test]
    async fn reports_summarize_assignments() {
        let double = InMemoryBackend::new().with_clock(fixed_clock());
        let user = learner("ada@example.com");
        let (course, _) = course_with_quiz();
        let course_id = course.id();
        double.seed_user(user.clone(), "pw");
        double.seed_course(course);
        double.seed_assignment(user.id(), course_id);
        double.set_active_user(user.id());

        double
            .put_progress(
                course_id,
                &ProgressUpdate {
                    is_completed: true,
                    notes: String::new(),
                    playback_position: 1.0,
                },
            )
            .await
            .unwrap();

        let reports = double.admin_reports().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].courses_enrolled, 1);
        assert_eq!(reports[0].courses_completed, 1);
        assert_eq!(reports[0].completion_percentage, 100.0);

        let detail = double.user_report(user.id()).await.unwrap();
        assert_eq!(detail.courses.len(), 1);
        assert_eq!(detail.courses[0].video_status, "Completed");
    }
}
