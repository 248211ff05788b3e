//! End-to-end course screen behavior against the in-memory backend:
//! graceful loading, debounced autosave, and the quiz-driven completion
//! rule.

use std::time::Duration;

use tokio::time::advance;

use api::{Backend, InMemoryBackend};
use lms_core::model::{
    Course, CourseId, Question, Quiz, QuizId, Role, User, UserId,
};
use lms_core::time::{fixed_clock, fixed_now};
use services::{AttemptState, CourseSession, QuizAttempt, ServiceError};

struct Fixture {
    double: InMemoryBackend,
    backend: Backend,
    course_id: CourseId,
    quiz_id: QuizId,
}

fn fixture() -> Fixture {
    let double = InMemoryBackend::new().with_clock(fixed_clock());

    let learner = User::new(
        UserId::random(),
        "learner@example.com",
        "Test Learner",
        Role::Learner,
        true,
        Some(fixed_now()),
    )
    .unwrap();

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
        "Intro to Rust",
        Some("ownership and borrowing".to_owned()),
        "https://youtu.be/dQw4w9WgXcQ",
        fixed_now(),
        vec![quiz],
        Vec::new(),
    )
    .unwrap();

    double.seed_course(course);
    double.set_answer_key(quiz_id, vec![0, 1]);
    double.set_active_user(learner.id());
    double.seed_assignment(learner.id(), course_id);
    double.seed_user(learner, "hunter2");

    let backend = Backend::from_double(double.clone());
    Fixture {
        double,
        backend,
        course_id,
        quiz_id,
    }
}

async fn settle() {
    // Let spawned save tasks run to completion on the paused runtime.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn missing_progress_starts_fresh() {
    let fx = fixture();
    let session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    let progress = session.progress();
    assert!(!progress.is_completed());
    assert_eq!(progress.notes(), "");
    assert_eq!(progress.playback_position(), 0.0);
    assert!(!session.quiz_unlocked());
    assert!(!session.has_pending_save());
    assert_eq!(
        session.video_embed_url(),
        "https://www.youtube.com/embed/dQw4w9WgXcQ"
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_course_fails_the_load() {
    let fx = fixture();
    let err = CourseSession::load(fx.backend, CourseId::random())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::CourseUnavailable(_)));
}

#[tokio::test(start_paused = true)]
async fn notes_edits_coalesce_into_one_save() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    session.on_notes_change("o");
    advance(Duration::from_millis(500)).await;
    session.on_notes_change("own");
    advance(Duration::from_millis(500)).await;
    session.on_notes_change("ownership");
    assert!(session.has_pending_save());
    assert_eq!(fx.double.progress_put_count(), 0);

    advance(Duration::from_millis(1500)).await;
    settle().await;

    assert_eq!(fx.double.progress_put_count(), 1);
    let stored = fx.double.stored_progress(fx.course_id).unwrap();
    assert_eq!(stored.notes(), "ownership");
    assert_eq!(session.last_synced().unwrap().notes(), "ownership");

    // An edit after the quiet window triggers a second, separate save.
    session.on_notes_change("ownership and borrowing");
    advance(Duration::from_millis(1500)).await;
    settle().await;

    assert_eq!(fx.double.progress_put_count(), 2);
    let stored = fx.double.stored_progress(fx.course_id).unwrap();
    assert_eq!(stored.notes(), "ownership and borrowing");
}

#[tokio::test(start_paused = true)]
async fn notes_and_playback_debounce_independently() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    session.on_notes_change("notes");
    session.on_playback_progress(0.25);

    // Notes quiet period (1.5s) elapses first.
    advance(Duration::from_millis(1500)).await;
    settle().await;
    assert_eq!(fx.double.progress_put_count(), 1);

    // Playback quiet period (2s) elapses half a second later.
    advance(Duration::from_millis(500)).await;
    settle().await;
    assert_eq!(fx.double.progress_put_count(), 2);

    let stored = fx.double.stored_progress(fx.course_id).unwrap();
    assert_eq!(stored.notes(), "notes");
    assert_eq!(stored.playback_position(), 0.25);
}

#[tokio::test(start_paused = true)]
async fn save_now_flushes_and_cancels_pending() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    session.on_notes_change("flush me");
    session.save_now().await.unwrap();
    assert_eq!(fx.double.progress_put_count(), 1);
    assert!(!session.has_pending_save());

    // The cancelled debounced save never fires.
    advance(Duration::from_millis(5000)).await;
    settle().await;
    assert_eq!(fx.double.progress_put_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn invalid_playback_report_is_ignored() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    session.on_playback_progress(1.5);
    assert!(!session.has_pending_save());
    assert_eq!(session.progress().playback_position(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn playback_reports_never_rewind_saved_position() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    session.on_playback_progress(0.8);
    session.on_playback_progress(0.3);
    advance(Duration::from_millis(2000)).await;
    settle().await;

    let stored = fx.double.stored_progress(fx.course_id).unwrap();
    assert_eq!(stored.playback_position(), 0.8);
}

#[tokio::test(start_paused = true)]
async fn passing_quiz_completes_course_and_saves_immediately() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    session.on_playback_progress(0.5);
    assert!(session.quiz_unlocked());

    let quiz = session.course().quiz(fx.quiz_id).unwrap().clone();
    let mut attempt = QuizAttempt::new(quiz);
    attempt.select_answer(0, 0).unwrap();
    attempt.select_answer(1, 1).unwrap();

    let submission = session.submit_quiz(&mut attempt).await.unwrap();
    assert_eq!(submission.score(), 100);
    assert!(submission.passed());
    assert!(session.progress().is_completed());

    // Completion was saved without waiting for any debounce.
    let stored = fx.double.stored_progress(fx.course_id).unwrap();
    assert!(stored.is_completed());
    assert!(matches!(attempt.state(), AttemptState::Submitted(_)));
}

#[tokio::test(start_paused = true)]
async fn failing_score_leaves_course_incomplete() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    let quiz = session.course().quiz(fx.quiz_id).unwrap().clone();
    let mut attempt = QuizAttempt::new(quiz);
    // One of two correct: 50, below the pass mark.
    attempt.select_answer(0, 0).unwrap();
    attempt.select_answer(1, 0).unwrap();

    let submission = session.submit_quiz(&mut attempt).await.unwrap();
    assert_eq!(submission.score(), 50);
    assert!(!submission.passed());
    assert!(!session.progress().is_completed());
    assert!(fx.double.stored_progress(fx.course_id).is_none());
}

#[tokio::test(start_paused = true)]
async fn unanswered_questions_submit_as_sentinels_and_grade_wrong() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    let quiz = session.course().quiz(fx.quiz_id).unwrap().clone();
    let mut attempt = QuizAttempt::new(quiz);
    attempt.select_answer(0, 0).unwrap();

    let submission = session.submit_quiz(&mut attempt).await.unwrap();
    assert_eq!(submission.score(), 50);
}

#[tokio::test(start_paused = true)]
async fn failed_submission_leaves_attempt_retryable() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    let quiz = session.course().quiz(fx.quiz_id).unwrap().clone();
    let mut attempt = QuizAttempt::new(quiz);
    attempt.select_answer(0, 0).unwrap();
    attempt.select_answer(1, 1).unwrap();

    fx.double.fail_next_submit();
    assert!(session.submit_quiz(&mut attempt).await.is_err());
    assert_eq!(*attempt.state(), AttemptState::InProgress);
    assert!(!session.progress().is_completed());

    // The retry succeeds with the same selections.
    let submission = session.submit_quiz(&mut attempt).await.unwrap();
    assert!(submission.passed());
    assert!(session.progress().is_completed());
}

#[tokio::test(start_paused = true)]
async fn quiz_from_another_course_is_rejected() {
    let fx = fixture();
    let mut session = CourseSession::load(fx.backend, fx.course_id).await.unwrap();

    let foreign = Quiz::new(
        QuizId::random(),
        CourseId::random(),
        "Other",
        vec![Question::new("Q", vec!["a".into(), "b".into()]).unwrap()],
    )
    .unwrap();
    let mut attempt = QuizAttempt::new(foreign);
    attempt.select_answer(0, 0).unwrap();

    let err = session.submit_quiz(&mut attempt).await.unwrap_err();
    assert!(matches!(err, ServiceError::UnknownQuiz(_)));
}
