//! Personal goals and their progress lifecycle.
//!
//! Status follows progress: `0` is not started, `1..=99` in progress and
//! `100` completed. A goal that is not completed and whose target date lies
//! before today is reported as overdue.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::define_label_enum;
use super::{Priority, UserId};

/// Maximum goal title length.
pub const GOAL_TITLE_MAX: usize = 120;
/// Maximum goal description length.
pub const GOAL_DESCRIPTION_MAX: usize = 2000;

define_label_enum! {
    /// Life area a goal belongs to.
    GoalCategory ("goal category") {
        /// Emotional wellbeing.
        Emotional => "emotional",
        /// Meditation and awareness practice.
        Mindfulness => "mindfulness",
        /// Exercise and physical health.
        Physical => "physical",
        /// Sleep hygiene.
        Sleep => "sleep",
        /// Relationships.
        Social => "social",
        /// Work and career.
        Professional => "professional",
        /// Anything else.
        Personal => "personal",
    }
}

define_label_enum! {
    /// Lifecycle state of a goal.
    GoalStatus ("goal status") {
        /// No progress recorded.
        NotStarted => "not_started",
        /// Partially complete.
        InProgress => "in_progress",
        /// Fully complete.
        Completed => "completed",
        /// Past its target date and not complete.
        Overdue => "overdue",
    }
}

impl GoalStatus {
    /// Status implied by a progress value alone.
    pub fn from_progress(progress: GoalProgress) -> Self {
        match progress.value() {
            0 => Self::NotStarted,
            100 => Self::Completed,
            _ => Self::InProgress,
        }
    }
}

/// Validation errors for goal input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GoalValidationError {
    /// Title was blank.
    #[error("goal title must not be empty")]
    EmptyTitle,
    /// Title too long.
    #[error("goal title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Description too long.
    #[error("goal description must be at most {max} characters")]
    DescriptionTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Progress outside 0..=100.
    #[error("progress must be between 0 and 100, got {actual}")]
    ProgressOutOfRange {
        /// Rejected value.
        actual: i64,
    },
}

/// Completion percentage in 0..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i16")]
pub struct GoalProgress(i16);

impl GoalProgress {
    /// Validate a raw percentage.
    pub fn new(value: i64) -> Result<Self, GoalValidationError> {
        if !(0..=100).contains(&value) {
            return Err(GoalValidationError::ProgressOutOfRange { actual: value });
        }
        i16::try_from(value)
            .map(Self)
            .map_err(|_| GoalValidationError::ProgressOutOfRange { actual: value })
    }

    /// Percentage value.
    pub fn value(self) -> i16 {
        self.0
    }
}

impl TryFrom<i64> for GoalProgress {
    type Error = GoalValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GoalProgress> for i16 {
    fn from(value: GoalProgress) -> Self {
        value.0
    }
}

/// A goal owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Row identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Life area.
    pub category: GoalCategory,
    /// Day by which the goal should be complete.
    pub target_date: NaiveDate,
    /// Completion percentage.
    pub progress: GoalProgress,
    /// Lifecycle state.
    pub status: GoalStatus,
    /// Urgency.
    pub priority: Priority,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Set progress and the status it implies.
    pub fn apply_progress(&mut self, progress: GoalProgress, now: DateTime<Utc>) {
        self.progress = progress;
        self.status = GoalStatus::from_progress(progress);
        self.updated_at = now;
    }

    /// Status as seen on `today`, accounting for an elapsed target date.
    ///
    /// # Examples
    /// ```
    /// use chrono::{NaiveDate, Utc};
    /// use mindtrack::domain::{GoalCategory, GoalStatus, NewGoal, Priority, UserId};
    ///
    /// let goal = NewGoal::try_from_parts(
    ///     "Walk daily",
    ///     None,
    ///     GoalCategory::Physical,
    ///     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    ///     Priority::Medium,
    /// )
    /// .unwrap()
    /// .into_goal(UserId::random(), Utc::now());
    /// let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    /// assert_eq!(goal.effective_status(today), GoalStatus::Overdue);
    /// ```
    pub fn effective_status(&self, today: NaiveDate) -> GoalStatus {
        let status = GoalStatus::from_progress(self.progress);
        if status != GoalStatus::Completed && self.target_date < today {
            GoalStatus::Overdue
        } else {
            status
        }
    }

    /// Replace the stored status with [`Goal::effective_status`].
    #[must_use]
    pub fn with_effective_status(mut self, today: NaiveDate) -> Self {
        self.status = self.effective_status(today);
        self
    }
}

/// Validated input for creating a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    title: String,
    description: String,
    category: GoalCategory,
    target_date: NaiveDate,
    priority: Priority,
}

impl NewGoal {
    /// Validate raw input.
    pub fn try_from_parts(
        title: &str,
        description: Option<&str>,
        category: GoalCategory,
        target_date: NaiveDate,
        priority: Priority,
    ) -> Result<Self, GoalValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(GoalValidationError::EmptyTitle);
        }
        if title.chars().count() > GOAL_TITLE_MAX {
            return Err(GoalValidationError::TitleTooLong {
                max: GOAL_TITLE_MAX,
            });
        }
        let description = description.unwrap_or_default().trim();
        if description.chars().count() > GOAL_DESCRIPTION_MAX {
            return Err(GoalValidationError::DescriptionTooLong {
                max: GOAL_DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            category,
            target_date,
            priority,
        })
    }

    /// Materialise a fresh goal for `user_id` with zero progress.
    pub fn into_goal(self, user_id: UserId, now: DateTime<Utc>) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id,
            title: self.title,
            description: self.description,
            category: self.category,
            target_date: self.target_date,
            progress: GoalProgress::default(),
            status: GoalStatus::NotStarted,
            priority: self.priority,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[fixture]
    fn goal() -> Goal {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().expect("time");
        NewGoal::try_from_parts(
            "Meditate",
            Some("Ten minutes a day"),
            GoalCategory::Mindfulness,
            date(2024, 3, 31),
            Priority::High,
        )
        .expect("valid goal")
        .into_goal(UserId::random(), now)
    }

    #[rstest]
    #[case(0, GoalStatus::NotStarted)]
    #[case(1, GoalStatus::InProgress)]
    #[case(99, GoalStatus::InProgress)]
    #[case(100, GoalStatus::Completed)]
    fn status_follows_progress(#[case] raw: i64, #[case] expected: GoalStatus) {
        let progress = GoalProgress::new(raw).expect("valid progress");
        assert_eq!(GoalStatus::from_progress(progress), expected);
    }

    #[rstest]
    #[case(-1)]
    #[case(101)]
    fn progress_rejects_out_of_range(#[case] raw: i64) {
        assert_eq!(
            GoalProgress::new(raw).expect_err("out of range"),
            GoalValidationError::ProgressOutOfRange { actual: raw }
        );
    }

    #[rstest]
    fn overdue_only_when_incomplete_and_past_target(mut goal: Goal) {
        assert_eq!(goal.effective_status(date(2024, 3, 31)), GoalStatus::NotStarted);
        assert_eq!(goal.effective_status(date(2024, 4, 1)), GoalStatus::Overdue);

        let now = Utc::now();
        goal.apply_progress(GoalProgress::new(100).expect("valid"), now);
        assert_eq!(goal.effective_status(date(2024, 4, 1)), GoalStatus::Completed);
        assert_eq!(goal.updated_at, now);
    }

    #[rstest]
    fn apply_progress_updates_status(mut goal: Goal) {
        goal.apply_progress(GoalProgress::new(40).expect("valid"), Utc::now());
        assert_eq!(goal.status, GoalStatus::InProgress);
        assert_eq!(goal.progress.value(), 40);
    }

    #[test]
    fn new_goal_rejects_blank_title() {
        let err = NewGoal::try_from_parts(
            "  ",
            None,
            GoalCategory::Sleep,
            date(2024, 1, 1),
            Priority::Low,
        )
        .expect_err("blank");
        assert_eq!(err, GoalValidationError::EmptyTitle);
    }

    #[rstest]
    fn serialises_wire_labels(goal: Goal) {
        let value = serde_json::to_value(&goal).expect("serialise");
        assert_eq!(value["category"], "mindfulness");
        assert_eq!(value["status"], "not_started");
        assert_eq!(value["targetDate"], "2024-03-31");
        assert_eq!(value["progress"], 0);
    }
}
