//! Client-side state machine for taking a quiz.
//!
//! The attempt only tracks selections; grading lives on the backend. An
//! attempt moves `NotStarted -> InProgress` on the first selection and
//! `-> Submitted` once a graded result comes back. `retake` starts over
//! with the same questions.

use thiserror::Error;

use lms_core::model::{NO_ANSWER, Quiz, QuizId, QuizSubmission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("question index {0} is out of range")]
    QuestionOutOfRange(usize),

    #[error("option index {option} is out of range for question {question}")]
    OptionOutOfRange { question: usize, option: usize },

    #[error("attempt was already submitted")]
    AlreadySubmitted,

    #[error("submission is for quiz {got}, attempt is for quiz {expected}")]
    SubmissionMismatch { expected: QuizId, got: QuizId },
}

/// Where the attempt is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    /// No answer selected yet; the submit action stays disabled.
    NotStarted,
    /// At least one answer selected.
    InProgress,
    /// Graded by the backend; selections are frozen.
    Submitted(QuizSubmission),
}

#[derive(Debug, Clone)]
pub struct QuizAttempt {
    quiz: Quiz,
    answers: Vec<Option<usize>>,
    current: usize,
    state: AttemptState,
}

impl QuizAttempt {
    #[must_use]
    pub fn new(quiz: Quiz) -> Self {
        let answers = vec![None; quiz.question_count()];
        Self {
            quiz,
            answers,
            current: 0,
            state: AttemptState::NotStarted,
        }
    }

    /// Index of the question currently shown.
    #[must_use]
    pub fn current_question(&self) -> usize {
        self.current
    }

    /// Steps to the next question, stopping at the last one.
    pub fn next_question(&mut self) {
        self.go_to_question(self.current + 1);
    }

    /// Steps back, stopping at the first question.
    pub fn previous_question(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Jumps to a question, clamped into range.
    pub fn go_to_question(&mut self, index: usize) {
        self.current = index.min(self.quiz.question_count().saturating_sub(1));
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz.id()
    }

    #[must_use]
    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// True once every question has a selection.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answered_count() == self.quiz.question_count()
    }

    /// True once submitting makes sense: something is selected and no
    /// result has come back yet.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        matches!(self.state, AttemptState::InProgress)
    }

    /// Records a selection. Re-selecting a question overwrites the earlier
    /// choice.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::AlreadySubmitted` after grading, and range
    /// errors for indices that do not exist in the quiz.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), QuizFlowError> {
        if matches!(self.state, AttemptState::Submitted(_)) {
            return Err(QuizFlowError::AlreadySubmitted);
        }
        let slot = self
            .answers
            .get_mut(question)
            .ok_or(QuizFlowError::QuestionOutOfRange(question))?;
        let option_count = self.quiz.questions()[question].options().len();
        if option >= option_count {
            return Err(QuizFlowError::OptionOutOfRange { question, option });
        }
        *slot = Some(option);
        self.state = AttemptState::InProgress;
        Ok(())
    }

    /// Answers in wire form: one index per question, in question order,
    /// with the `NO_ANSWER` sentinel for questions left blank. The backend
    /// grades the sentinel as wrong, so a partial submission is still a
    /// full-length vector.
    #[must_use]
    pub fn wire_answers(&self) -> Vec<i32> {
        self.answers
            .iter()
            .map(|answer| match answer {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                Some(index) => *index as i32,
                None => NO_ANSWER,
            })
            .collect()
    }

    /// Freezes the attempt with its graded result. Only the controller that
    /// performed the submission calls this; a failed request leaves the
    /// attempt `InProgress` so the learner can retry.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::AlreadySubmitted` if a result was already
    /// recorded, and `SubmissionMismatch` if the result belongs to another
    /// quiz.
    pub fn mark_submitted(&mut self, submission: QuizSubmission) -> Result<(), QuizFlowError> {
        if matches!(self.state, AttemptState::Submitted(_)) {
            return Err(QuizFlowError::AlreadySubmitted);
        }
        if submission.quiz_id() != self.quiz.id() {
            return Err(QuizFlowError::SubmissionMismatch {
                expected: self.quiz.id(),
                got: submission.quiz_id(),
            });
        }
        self.state = AttemptState::Submitted(submission);
        Ok(())
    }

    /// Graded result, once submitted.
    #[must_use]
    pub fn result(&self) -> Option<&QuizSubmission> {
        match &self.state {
            AttemptState::Submitted(submission) => Some(submission),
            _ => None,
        }
    }

    /// Clears selections and the previous result for another try.
    pub fn retake(&mut self) {
        self.answers = vec![None; self.quiz.question_count()];
        self.current = 0;
        self.state = AttemptState::NotStarted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::model::{CourseId, Question, SubmissionId, UserId};
    use lms_core::time::fixed_now;

    fn quiz() -> Quiz {
        Quiz::new(
            QuizId::random(),
            CourseId::random(),
            "Checkpoint",
            vec![
                Question::new("Q1", vec!["a".into(), "b".into(), "c".into()]).unwrap(),
                Question::new("Q2", vec!["a".into(), "b".into()]).unwrap(),
            ],
        )
        .unwrap()
    }

    fn graded(quiz_id: QuizId, score: u32) -> QuizSubmission {
        QuizSubmission::new(
            SubmissionId::random(),
            quiz_id,
            UserId::random(),
            score,
            fixed_now(),
        )
    }

    #[test]
    fn first_selection_starts_the_attempt() {
        let mut attempt = QuizAttempt::new(quiz());
        assert_eq!(*attempt.state(), AttemptState::NotStarted);
        assert!(!attempt.can_submit());

        attempt.select_answer(0, 2).unwrap();
        assert_eq!(*attempt.state(), AttemptState::InProgress);
        assert!(attempt.can_submit());
        assert_eq!(attempt.answered_count(), 1);
        assert!(!attempt.is_complete());
    }

    #[test]
    fn reselecting_overwrites() {
        let mut attempt = QuizAttempt::new(quiz());
        attempt.select_answer(0, 0).unwrap();
        attempt.select_answer(0, 1).unwrap();
        assert_eq!(attempt.answers()[0], Some(1));
        assert_eq!(attempt.answered_count(), 1);
    }

    #[test]
    fn wire_answers_use_sentinel_for_blanks() {
        let mut attempt = QuizAttempt::new(quiz());
        attempt.select_answer(1, 0).unwrap();
        assert_eq!(attempt.wire_answers(), vec![NO_ANSWER, 0]);
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut attempt = QuizAttempt::new(quiz());
        assert_eq!(
            attempt.select_answer(5, 0).unwrap_err(),
            QuizFlowError::QuestionOutOfRange(5)
        );
        assert_eq!(
            attempt.select_answer(1, 9).unwrap_err(),
            QuizFlowError::OptionOutOfRange {
                question: 1,
                option: 9
            }
        );
    }

    #[test]
    fn submission_freezes_selections() {
        let mut attempt = QuizAttempt::new(quiz());
        attempt.select_answer(0, 0).unwrap();
        attempt
            .mark_submitted(graded(attempt.quiz_id(), 50))
            .unwrap();

        assert_eq!(
            attempt.select_answer(1, 0).unwrap_err(),
            QuizFlowError::AlreadySubmitted
        );
        assert_eq!(attempt.result().map(QuizSubmission::score), Some(50));
        assert!(!attempt.can_submit());
    }

    #[test]
    fn mismatched_submission_is_rejected() {
        let mut attempt = QuizAttempt::new(quiz());
        attempt.select_answer(0, 0).unwrap();
        let err = attempt
            .mark_submitted(graded(QuizId::random(), 100))
            .unwrap_err();
        assert!(matches!(err, QuizFlowError::SubmissionMismatch { .. }));
    }

    #[test]
    fn navigation_clamps_to_question_range() {
        let mut attempt = QuizAttempt::new(quiz());
        assert_eq!(attempt.current_question(), 0);

        attempt.previous_question();
        assert_eq!(attempt.current_question(), 0);

        attempt.next_question();
        assert_eq!(attempt.current_question(), 1);
        attempt.next_question();
        assert_eq!(attempt.current_question(), 1);

        attempt.go_to_question(99);
        assert_eq!(attempt.current_question(), 1);
        attempt.go_to_question(0);
        assert_eq!(attempt.current_question(), 0);
    }

    #[test]
    fn retake_resets_everything() {
        let mut attempt = QuizAttempt::new(quiz());
        attempt.select_answer(0, 0).unwrap();
        attempt.select_answer(1, 1).unwrap();
        attempt
            .mark_submitted(graded(attempt.quiz_id(), 100))
            .unwrap();

        attempt.next_question();
        attempt.retake();
        assert_eq!(*attempt.state(), AttemptState::NotStarted);
        assert_eq!(attempt.answered_count(), 0);
        assert_eq!(attempt.current_question(), 0);
        assert!(attempt.result().is_none());
    }
}
