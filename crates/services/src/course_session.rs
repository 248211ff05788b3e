//! Controller for one open course: video progress, notes, and quizzes.
//!
//! Loading degrades gracefully: the course itself is required, but missing
//! progress starts fresh and an unavailable resource list falls back to
//! whatever the course detail carried. Edits are saved in the background
//! after a quiet period; notes and playback debounce independently so
//! typing does not delay a playback save or vice versa.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use api::schema::{ProgressUpdate, QuizSubmitRequest};
use api::{Backend, ProgressApi};
use lms_core::model::{Course, CourseId, Progress, QuizSubmission, Resource};

use crate::autosave::{SaveDebouncer, SaveSequencer};
use crate::error::ServiceError;
use crate::quiz::QuizAttempt;

/// Quiet period after the last keystroke before notes are saved.
const NOTES_QUIET: Duration = Duration::from_millis(1500);

/// Quiet period after the last playback report before position is saved.
const PLAYBACK_QUIET: Duration = Duration::from_millis(2000);

pub struct CourseSession {
    backend: Backend,
    course: Course,
    resources: Vec<Resource>,
    progress: Arc<Mutex<Progress>>,
    last_synced: Arc<Mutex<Option<Progress>>>,
    sequencer: Arc<SaveSequencer>,
    in_flight: Arc<AtomicUsize>,
    notes_saver: SaveDebouncer,
    playback_saver: SaveDebouncer,
}

impl std::fmt::Debug for CourseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseSession")
            .field("course", &self.course)
            .finish_non_exhaustive()
    }
}

impl CourseSession {
    /// Fetches everything the course screen needs.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::CourseUnavailable` when the course fetch
    /// fails; progress and resource failures are absorbed.
    pub async fn load(backend: Backend, course_id: CourseId) -> Result<Self, ServiceError> {
        let course = backend
            .courses
            .get_course(course_id)
            .await
            .map_err(ServiceError::CourseUnavailable)?;

        // Absent progress is the first-visit case, not a failure.
        let progress = backend
            .progress
            .get_progress(course_id)
            .await?
            .unwrap_or_default();

        let resources = match backend.resources.list_resources(course_id).await {
            Ok(resources) => resources,
            Err(err) => {
                warn!(%course_id, error = %err, "resource list unavailable, using course detail");
                course.resources().to_vec()
            }
        };

        info!(%course_id, title = course.title(), "course session loaded");
        Ok(Self {
            backend,
            course,
            resources,
            progress: Arc::new(Mutex::new(progress)),
            last_synced: Arc::new(Mutex::new(None)),
            sequencer: Arc::new(SaveSequencer::new()),
            in_flight: Arc::new(AtomicUsize::new(0)),
            notes_saver: SaveDebouncer::new(NOTES_QUIET),
            playback_saver: SaveDebouncer::new(PLAYBACK_QUIET),
        })
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Embeddable form of the course video URL for the player.
    #[must_use]
    pub fn video_embed_url(&self) -> String {
        lms_core::video::embed_url(self.course.video_url())
    }

    /// Current local progress state, including unsaved edits.
    #[must_use]
    pub fn progress(&self) -> Progress {
        lock(&self.progress).clone()
    }

    /// Last progress state acknowledged by the backend, if any save has
    /// completed this session.
    #[must_use]
    pub fn last_synced(&self) -> Option<Progress> {
        lock(&self.last_synced).clone()
    }

    /// True while either debouncer holds an unfired save.
    #[must_use]
    pub fn has_pending_save(&self) -> bool {
        self.notes_saver.is_pending() || self.playback_saver.is_pending()
    }

    /// True while a save is pending or a request is on the wire; drives
    /// the "saving…" indicator.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.has_pending_save() || self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// The quiz section unlocks once any playback has been reported.
    #[must_use]
    pub fn quiz_unlocked(&self) -> bool {
        lock(&self.progress).has_started_video()
    }

    /// Applies a notes edit and schedules a debounced save.
    pub fn on_notes_change(&mut self, notes: impl Into<String>) {
        lock(&self.progress).set_notes(notes);
        let save = self.save_task();
        self.notes_saver.schedule(save);
    }

    /// Applies a playback report and schedules a debounced save. Reports
    /// that would rewind the stored position still count as watching, so
    /// they are accepted (and dropped by the monotonic rule); malformed
    /// fractions from the player are logged and ignored.
    pub fn on_playback_progress(&mut self, fraction: f64) {
        if let Err(err) = lock(&self.progress).advance_playback(fraction) {
            warn!(error = %err, "ignoring invalid playback report");
            return;
        }
        let save = self.save_task();
        self.playback_saver.schedule(save);
    }

    /// Saves immediately, cancelling any pending debounced saves.
    ///
    /// # Errors
    ///
    /// Returns the underlying `ApiError`; local state keeps the edits so a
    /// later save can retry.
    pub async fn save_now(&mut self) -> Result<Progress, ServiceError> {
        self.notes_saver.cancel();
        self.playback_saver.cancel();

        let update = ProgressUpdate::from(&self.progress());
        let ticket = self.sequencer.begin();
        let _guard = InFlight::start(&self.in_flight);
        let echo = self
            .backend
            .progress
            .put_progress(self.course.id(), &update)
            .await?;
        if self.sequencer.try_apply(ticket) {
            *lock(&self.last_synced) = Some(echo.clone());
        }
        Ok(echo)
    }

    /// Submits a quiz attempt for grading. A passing score completes the
    /// course and is saved immediately; a failed request leaves both the
    /// attempt and the progress untouched.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::UnknownQuiz` for an attempt on another
    /// course's quiz, and propagates submission or save failures.
    pub async fn submit_quiz(
        &mut self,
        attempt: &mut QuizAttempt,
    ) -> Result<QuizSubmission, ServiceError> {
        if self.course.quiz(attempt.quiz_id()).is_none() {
            return Err(ServiceError::UnknownQuiz(attempt.quiz_id()));
        }

        let request = QuizSubmitRequest {
            quiz_id: attempt.quiz_id(),
            answers: attempt.wire_answers(),
        };
        let submission = self.backend.quizzes.submit_quiz(&request).await?;
        if let Err(err) = attempt.mark_submitted(submission.clone()) {
            // The backend graded it either way; the attempt just can't
            // represent the result (double submit race in the UI).
            warn!(error = %err, "graded result could not be recorded on the attempt");
        }

        if submission.passed() {
            info!(quiz_id = %submission.quiz_id(), score = submission.score(), "quiz passed, completing course");
            lock(&self.progress).complete_by_quiz();
            self.save_now().await?;
        } else {
            debug!(quiz_id = %submission.quiz_id(), score = submission.score(), "quiz not passed");
        }
        Ok(submission)
    }

    /// The future both debouncers run: snapshot at fire time, stamp, send,
    /// and apply the echo only if no newer response beat it.
    fn save_task(&self) -> impl Future<Output = ()> + Send + 'static {
        let course_id = self.course.id();
        let api = Arc::clone(&self.backend.progress);
        let progress = Arc::clone(&self.progress);
        let sequencer = Arc::clone(&self.sequencer);
        let last_synced = Arc::clone(&self.last_synced);
        let in_flight = Arc::clone(&self.in_flight);
        async move {
            push_progress(
                &*api,
                course_id,
                &progress,
                &sequencer,
                &last_synced,
                &in_flight,
            )
            .await;
        }
    }
}

async fn push_progress(
    api: &dyn ProgressApi,
    course_id: CourseId,
    progress: &Mutex<Progress>,
    sequencer: &SaveSequencer,
    last_synced: &Mutex<Option<Progress>>,
    in_flight: &Arc<AtomicUsize>,
) {
    let update = ProgressUpdate::from(&*lock(progress));
    let ticket = sequencer.begin();
    let _guard = InFlight::start(in_flight);
    match api.put_progress(course_id, &update).await {
        Ok(echo) => {
            if sequencer.try_apply(ticket) {
                *lock(last_synced) = Some(echo);
            } else {
                debug!(%course_id, "discarding stale save response");
            }
        }
        // Local state keeps the edits; the next change reschedules a save.
        Err(err) => warn!(%course_id, error = %err, "background progress save failed"),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps the in-flight counter balanced on every exit path.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn start(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
