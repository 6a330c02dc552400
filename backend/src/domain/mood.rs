//! Mood journal entries.
//!
//! Entries are immutable once logged; they are removed only by a purge of the
//! owning user's data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Lowest accepted mood score.
pub const MOOD_SCORE_MIN: i16 = 1;
/// Highest accepted mood score.
pub const MOOD_SCORE_MAX: i16 = 10;
/// Maximum note length in characters.
pub const MOOD_NOTE_MAX: usize = 2000;

/// Validation errors for mood journal input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoodValidationError {
    /// Score outside the 1..=10 scale.
    #[error("mood score must be between {min} and {max}, got {actual}")]
    ScoreOutOfRange {
        /// Lower bound.
        min: i16,
        /// Upper bound.
        max: i16,
        /// Rejected value.
        actual: i64,
    },
    /// Note longer than [`MOOD_NOTE_MAX`].
    #[error("notes must be at most {max} characters")]
    NoteTooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// Self-reported mood on a 1..=10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i16")]
pub struct MoodScore(i16);

impl MoodScore {
    /// Validate a raw score.
    ///
    /// # Examples
    /// ```
    /// use mindtrack::domain::MoodScore;
    ///
    /// assert_eq!(MoodScore::new(7).unwrap().value(), 7);
    /// assert!(MoodScore::new(11).is_err());
    /// ```
    pub fn new(value: i64) -> Result<Self, MoodValidationError> {
        let in_range = i64::from(MOOD_SCORE_MIN)..=i64::from(MOOD_SCORE_MAX);
        if !in_range.contains(&value) {
            return Err(MoodValidationError::ScoreOutOfRange {
                min: MOOD_SCORE_MIN,
                max: MOOD_SCORE_MAX,
                actual: value,
            });
        }
        i16::try_from(value)
            .map(Self)
            .map_err(|_| MoodValidationError::ScoreOutOfRange {
                min: MOOD_SCORE_MIN,
                max: MOOD_SCORE_MAX,
                actual: value,
            })
    }

    /// Numeric score.
    pub fn value(self) -> i16 {
        self.0
    }
}

impl TryFrom<i64> for MoodScore {
    type Error = MoodValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MoodScore> for i16 {
    fn from(value: MoodScore) -> Self {
        value.0
    }
}

/// Free-text journal note. Empty notes are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MoodNote(String);

impl MoodNote {
    /// Validate a note; surrounding whitespace is trimmed.
    pub fn new(note: impl AsRef<str>) -> Result<Self, MoodValidationError> {
        let trimmed = note.as_ref().trim();
        if trimmed.chars().count() > MOOD_NOTE_MAX {
            return Err(MoodValidationError::NoteTooLong { max: MOOD_NOTE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for MoodNote {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MoodNote> for String {
    fn from(value: MoodNote) -> Self {
        value.0
    }
}

impl TryFrom<String> for MoodNote {
    type Error = MoodValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A single logged mood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    /// Row identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Mood score.
    pub score: MoodScore,
    /// Journal note.
    pub notes: MoodNote,
    /// When the mood was experienced.
    pub recorded_at: DateTime<Utc>,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

/// Validated input for logging a mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMoodEntry {
    /// Mood score.
    pub score: MoodScore,
    /// Journal note.
    pub notes: MoodNote,
    /// Explicit timestamp; the service clock is used when absent.
    pub recorded_at: Option<DateTime<Utc>>,
}

impl NewMoodEntry {
    /// Validate raw input.
    pub fn try_from_parts(
        score: i64,
        notes: Option<&str>,
        recorded_at: Option<DateTime<Utc>>,
    ) -> Result<Self, MoodValidationError> {
        Ok(Self {
            score: MoodScore::new(score)?,
            notes: MoodNote::new(notes.unwrap_or_default())?,
            recorded_at,
        })
    }

    /// Materialise the entry for `user_id`, stamping missing times with `now`.
    pub fn into_entry(self, user_id: UserId, now: DateTime<Utc>) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            user_id,
            score: self.score,
            notes: self.notes,
            recorded_at: self.recorded_at.unwrap_or(now),
            created_at: now,
        }
    }
}
