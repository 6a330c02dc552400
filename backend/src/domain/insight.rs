//! Insights shown on the dashboard.
//!
//! Insights are stored rows; nothing in the backend infers them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::define_label_enum;
use super::{Priority, UserId};

/// Maximum insight title length.
pub const INSIGHT_TITLE_MAX: usize = 120;
/// Maximum insight description length.
pub const INSIGHT_DESCRIPTION_MAX: usize = 2000;

define_label_enum! {
    /// What an insight is telling the user.
    InsightKind ("insight type") {
        /// Suggested action.
        Recommendation => "recommendation",
        /// Observed trend.
        Pattern => "pattern",
        /// Something to watch.
        Warning => "warning",
        /// Positive reinforcement.
        Celebration => "celebration",
        /// Achievement marker.
        Milestone => "milestone",
    }
}

/// Validation errors for insight input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsightValidationError {
    /// Title was blank.
    #[error("insight title must not be empty")]
    EmptyTitle,
    /// Title too long.
    #[error("insight title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Description too long.
    #[error("insight description must be at most {max} characters")]
    DescriptionTooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// A stored insight belonging to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    /// Row identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Insight category.
    #[serde(rename = "type")]
    pub kind: InsightKind,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Urgency.
    pub priority: Priority,
    /// Whether the insight suggests a concrete action.
    pub actionable: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Insight {
    /// Validate and build an insight.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use mindtrack::domain::{Insight, InsightKind, Priority, UserId};
    ///
    /// let insight = Insight::try_new(
    ///     UserId::random(),
    ///     InsightKind::Pattern,
    ///     "Mornings are brighter",
    ///     "Your mood tends to be higher before noon.",
    ///     Priority::Low,
    ///     false,
    ///     Utc::now(),
    /// )
    /// .unwrap();
    /// assert_eq!(insight.kind.as_str(), "pattern");
    /// ```
    pub fn try_new(
        user_id: UserId,
        kind: InsightKind,
        title: &str,
        description: &str,
        priority: Priority,
        actionable: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, InsightValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(InsightValidationError::EmptyTitle);
        }
        if title.chars().count() > INSIGHT_TITLE_MAX {
            return Err(InsightValidationError::TitleTooLong {
                max: INSIGHT_TITLE_MAX,
            });
        }
        let description = description.trim();
        if description.chars().count() > INSIGHT_DESCRIPTION_MAX {
            return Err(InsightValidationError::DescriptionTooLong {
                max: INSIGHT_DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.to_owned(),
            description: description.to_owned(),
            priority,
            actionable,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn build(title: &str, description: &str) -> Result<Insight, InsightValidationError> {
        Insight::try_new(
            UserId::random(),
            InsightKind::Warning,
            title,
            description,
            Priority::High,
            true,
            Utc::now(),
        )
    }

    #[rstest]
    #[case("", "", InsightValidationError::EmptyTitle)]
    #[case(&"t".repeat(INSIGHT_TITLE_MAX + 1), "", InsightValidationError::TitleTooLong { max: INSIGHT_TITLE_MAX })]
    #[case("ok", &"d".repeat(INSIGHT_DESCRIPTION_MAX + 1), InsightValidationError::DescriptionTooLong { max: INSIGHT_DESCRIPTION_MAX })]
    fn rejects_invalid_text(
        #[case] title: &str,
        #[case] description: &str,
        #[case] expected: InsightValidationError,
    ) {
        assert_eq!(build(title, description).expect_err("invalid"), expected);
    }

    #[test]
    fn serialises_kind_as_type() {
        let insight = build("Sleep dipped", "Three short nights in a row.").expect("valid");
        let value = serde_json::to_value(&insight).expect("serialise");
        assert_eq!(value["type"], "warning");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["actionable"], true);
    }

    #[rstest]
    #[case("recommendation", InsightKind::Recommendation)]
    #[case("milestone", InsightKind::Milestone)]
    fn kind_parses_wire_form(#[case] raw: &str, #[case] expected: InsightKind) {
        assert_eq!(raw.parse::<InsightKind>().expect("known"), expected);
    }
}
