//! Goal creation, progress tracking and export.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::export::goals_csv;
use crate::domain::ports::{GoalRepository, ListOptions, SortOrder};
use crate::domain::{Error, Goal, GoalProgress, NewGoal, UserId};

/// Use-cases over a user's goals.
///
/// Statuses returned to callers account for elapsed target dates.
#[derive(Clone)]
pub struct GoalService {
    goals: Arc<dyn GoalRepository>,
    clock: Arc<dyn Clock>,
}

impl GoalService {
    /// Create the service.
    pub fn new(goals: Arc<dyn GoalRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { goals, clock }
    }

    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }

    /// Create a goal for `user_id`.
    pub async fn create(&self, user_id: &UserId, input: NewGoal) -> Result<Goal, Error> {
        let goal = input.into_goal(user_id.clone(), self.clock.utc());
        self.goals.insert(&goal).await?;
        info!(user_id = %user_id, goal_id = %goal.id, "goal created");
        Ok(goal.with_effective_status(self.today()))
    }

    /// Goals owned by `user_id`.
    pub async fn list(&self, user_id: &UserId, options: ListOptions) -> Result<Vec<Goal>, Error> {
        let today = self.today();
        let goals = self.goals.list_for_user(user_id, options).await?;
        Ok(goals
            .into_iter()
            .map(|goal| goal.with_effective_status(today))
            .collect())
    }

    /// Record progress on a goal owned by `user_id`.
    ///
    /// Goals belonging to other users are reported as missing.
    pub async fn update_progress(
        &self,
        user_id: &UserId,
        goal_id: Uuid,
        progress: GoalProgress,
    ) -> Result<Goal, Error> {
        let mut goal = self
            .goals
            .find(user_id, goal_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("goal {goal_id} not found")))?;
        goal.apply_progress(progress, self.clock.utc());
        if !self.goals.update(&goal).await? {
            return Err(Error::not_found(format!("goal {goal_id} not found")));
        }
        Ok(goal.with_effective_status(self.today()))
    }

    /// Delete a goal owned by `user_id`.
    pub async fn delete(&self, user_id: &UserId, goal_id: Uuid) -> Result<(), Error> {
        if self.goals.delete(user_id, goal_id).await? {
            info!(user_id = %user_id, goal_id = %goal_id, "goal deleted");
            Ok(())
        } else {
            Err(Error::not_found(format!("goal {goal_id} not found")))
        }
    }

    /// Every goal of `user_id` as CSV, oldest first.
    pub async fn export_csv(&self, user_id: &UserId) -> Result<String, Error> {
        let goals = self
            .list(
                user_id,
                ListOptions::default().with_order(SortOrder::OldestFirst),
            )
            .await?;
        Ok(goals_csv(&goals))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockGoalRepository;
    use crate::domain::{ErrorCode, GoalCategory, GoalStatus, Priority};
    use chrono::{DateTime, TimeZone, Utc};
    use mockable::MockClock;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).single().expect("time")
    }

    fn clock(now: DateTime<Utc>) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(now);
        clock
    }

    fn goal_for(user: &UserId, target: NaiveDate, now: DateTime<Utc>) -> Goal {
        NewGoal::try_from_parts(
            "Journal nightly",
            None,
            GoalCategory::Emotional,
            target,
            Priority::Medium,
        )
        .expect("valid")
        .into_goal(user.clone(), now)
    }

    #[rstest]
    #[tokio::test]
    async fn list_marks_past_due_goals_overdue(now: DateTime<Utc>) {
        let user = UserId::random();
        let past = goal_for(&user, NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"), now);
        let future = goal_for(&user, NaiveDate::from_ymd_opt(2024, 6, 1).expect("date"), now);
        let mut repo = MockGoalRepository::new();
        repo.expect_list_for_user()
            .return_once(move |_, _| Ok(vec![past, future]));

        let goals = GoalService::new(Arc::new(repo), Arc::new(clock(now)))
            .list(&user, ListOptions::default())
            .await
            .expect("list");
        let statuses: Vec<_> = goals.iter().map(|g| g.status).collect();
        assert_eq!(statuses, vec![GoalStatus::Overdue, GoalStatus::NotStarted]);
    }

    #[rstest]
    #[tokio::test]
    async fn update_progress_completes_goal(now: DateTime<Utc>) {
        let user = UserId::random();
        let goal = goal_for(&user, NaiveDate::from_ymd_opt(2024, 6, 1).expect("date"), now);
        let goal_id = goal.id;
        let mut repo = MockGoalRepository::new();
        repo.expect_find().return_once(move |_, _| Ok(Some(goal)));
        repo.expect_update()
            .withf(|goal| goal.status == GoalStatus::Completed && goal.progress.value() == 100)
            .return_once(|_| Ok(true));

        let updated = GoalService::new(Arc::new(repo), Arc::new(clock(now)))
            .update_progress(&user, goal_id, GoalProgress::new(100).expect("valid"))
            .await
            .expect("updated");
        assert_eq!(updated.status, GoalStatus::Completed);
    }

    #[rstest]
    #[tokio::test]
    async fn update_progress_on_foreign_goal_is_not_found(now: DateTime<Utc>) {
        let mut repo = MockGoalRepository::new();
        repo.expect_find().return_once(|_, _| Ok(None));
        repo.expect_update().never();

        let err = GoalService::new(Arc::new(repo), Arc::new(clock(now)))
            .update_progress(
                &UserId::random(),
                Uuid::new_v4(),
                GoalProgress::new(10).expect("valid"),
            )
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::NotFound))]
    #[tokio::test]
    async fn delete_reports_missing_goals(
        #[case] deleted: bool,
        #[case] expected_error: Option<ErrorCode>,
    ) {
        let mut repo = MockGoalRepository::new();
        repo.expect_delete().return_once(move |_, _| Ok(deleted));

        let result = GoalService::new(Arc::new(repo), Arc::new(MockClock::new()))
            .delete(&UserId::random(), Uuid::new_v4())
            .await;
        assert_eq!(result.err().map(|err| err.code()), expected_error);
    }
}
