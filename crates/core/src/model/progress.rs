use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("playback position must be a finite fraction in 0..=1, got {0}")]
    InvalidPlaybackPosition(f64),
}

/// Per-user per-course learning state: completion flag, free-form notes,
/// and video playback position as a fraction of total duration.
///
/// Created implicitly on first save; the client never deletes it. The only
/// way `is_completed` becomes true is a passing quiz submission
/// (`complete_by_quiz`) — there is no manual toggle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Progress {
    is_completed: bool,
    notes: String,
    playback_position: f64,
}

impl Progress {
    /// Rehydrates progress from a backend record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidPlaybackPosition` if the fraction is
    /// not finite or falls outside `0..=1`.
    pub fn from_persisted(
        is_completed: bool,
        notes: impl Into<String>,
        playback_position: f64,
    ) -> Result<Self, ProgressError> {
        validate_position(playback_position)?;
        Ok(Self {
            is_completed,
            notes: notes.into(),
            playback_position,
        })
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[must_use]
    pub fn playback_position(&self) -> f64 {
        self.playback_position
    }

    /// Replaces the notes text.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Records a playback report from the video player.
    ///
    /// Playback reporting never rewinds the stored position; an explicit
    /// overwrite goes through `set_playback_position` instead.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidPlaybackPosition` for fractions
    /// outside `0..=1`.
    pub fn advance_playback(&mut self, fraction: f64) -> Result<(), ProgressError> {
        validate_position(fraction)?;
        if fraction > self.playback_position {
            self.playback_position = fraction;
        }
        Ok(())
    }

    /// Overwrites the playback position, allowing rewinds.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidPlaybackPosition` for fractions
    /// outside `0..=1`.
    pub fn set_playback_position(&mut self, fraction: f64) -> Result<(), ProgressError> {
        validate_position(fraction)?;
        self.playback_position = fraction;
        Ok(())
    }

    /// Marks the course completed. Named for its single caller: the quiz
    /// pass path is the only authoritative completion rule.
    pub fn complete_by_quiz(&mut self) {
        self.is_completed = true;
    }

    /// True once any playback has been reported; the quiz section stays
    /// locked until then.
    #[must_use]
    pub fn has_started_video(&self) -> bool {
        self.playback_position > 0.0
    }
}

fn validate_position(fraction: f64) -> Result<(), ProgressError> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(ProgressError::InvalidPlaybackPosition(fraction));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_progress_is_empty() {
        let progress = Progress::default();
        assert!(!progress.is_completed());
        assert_eq!(progress.notes(), "");
        assert_eq!(progress.playback_position(), 0.0);
        assert!(!progress.has_started_video());
    }

    #[test]
    fn advance_playback_is_monotonic() {
        let mut progress = Progress::default();
        progress.advance_playback(0.5).unwrap();
        progress.advance_playback(0.3).unwrap();
        assert_eq!(progress.playback_position(), 0.5);
        progress.advance_playback(0.9).unwrap();
        assert_eq!(progress.playback_position(), 0.9);
    }

    #[test]
    fn set_playback_position_allows_rewind() {
        let mut progress = Progress::default();
        progress.advance_playback(0.8).unwrap();
        progress.set_playback_position(0.2).unwrap();
        assert_eq!(progress.playback_position(), 0.2);
    }

    #[test]
    fn rejects_out_of_range_fractions() {
        let mut progress = Progress::default();
        assert!(progress.advance_playback(1.5).is_err());
        assert!(progress.advance_playback(-0.1).is_err());
        assert!(progress.advance_playback(f64::NAN).is_err());
        assert!(Progress::from_persisted(false, "", 2.0).is_err());
    }

    #[test]
    fn completion_only_via_quiz_path() {
        let mut progress = Progress::default();
        progress.complete_by_quiz();
        assert!(progress.is_completed());
    }
}
