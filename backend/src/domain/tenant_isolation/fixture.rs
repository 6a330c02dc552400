//! Per-run tenant fixtures.
//!
//! A fixture describes a handful of users and the rows each of them owns.
//! Every build mints fresh user ids and run-scoped emails, so fixtures never
//! collide with rows that already exist in the store.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::domain::ports::{TenantSeed, UserAccount};
use crate::domain::{
    DisplayName, Email, Goal, GoalCategory, GoalProgress, GoalValidationError, Insight,
    InsightKind, InsightValidationError, MoodValidationError, NewGoal, NewMoodEntry,
    PasswordDigest, Priority, User, UserId, UserValidationError,
};
use crate::domain::{MoodEntry, TenantTable};

/// Digest stored for fixture accounts. It is not a PHC string, so no password
/// ever verifies against it.
const UNUSABLE_DIGEST: &str = "!fixture-account";

/// Errors raised while materialising a fixture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixtureError {
    /// A tenant label produced an invalid email or display name.
    #[error("invalid fixture user: {0}")]
    User(#[from] UserValidationError),
    /// A mood row was invalid.
    #[error("invalid fixture mood entry: {0}")]
    Mood(#[from] MoodValidationError),
    /// An insight row was invalid.
    #[error("invalid fixture insight: {0}")]
    Insight(#[from] InsightValidationError),
    /// A goal row was invalid.
    #[error("invalid fixture goal: {0}")]
    Goal(#[from] GoalValidationError),
}

#[derive(Debug, Clone)]
struct InsightSpec {
    kind: InsightKind,
    title: String,
    priority: Priority,
}

#[derive(Debug, Clone)]
struct GoalSpec {
    title: String,
    category: GoalCategory,
    progress: i64,
}

/// Rows requested for one tenant.
#[derive(Debug, Clone)]
pub struct TenantSpec {
    label: String,
    moods: Vec<(i64, String)>,
    insights: Vec<InsightSpec>,
    goals: Vec<GoalSpec>,
}

impl TenantSpec {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            moods: Vec::new(),
            insights: Vec::new(),
            goals: Vec::new(),
        }
    }

    /// Add a mood entry.
    #[must_use]
    pub fn mood(mut self, score: i64, note: &str) -> Self {
        self.moods.push((score, note.to_owned()));
        self
    }

    /// Add one mood entry per score, without notes.
    #[must_use]
    pub fn moods(mut self, scores: impl IntoIterator<Item = i64>) -> Self {
        self.moods
            .extend(scores.into_iter().map(|score| (score, String::new())));
        self
    }

    /// Add an insight.
    #[must_use]
    pub fn insight(mut self, kind: InsightKind, title: &str) -> Self {
        self.insights.push(InsightSpec {
            kind,
            title: title.to_owned(),
            priority: Priority::Medium,
        });
        self
    }

    /// Add a goal at the given progress.
    #[must_use]
    pub fn goal(mut self, title: &str, category: GoalCategory, progress: i64) -> Self {
        self.goals.push(GoalSpec {
            title: title.to_owned(),
            category,
            progress,
        });
        self
    }
}

/// Builder for [`TenantFixture`].
#[derive(Debug, Clone)]
pub struct TenantFixtureBuilder {
    base_time: DateTime<Utc>,
    run_token: String,
    tenants: Vec<TenantSpec>,
}

impl TenantFixtureBuilder {
    /// Add a tenant configured by `configure`.
    #[must_use]
    pub fn tenant(mut self, label: &str, configure: impl FnOnce(TenantSpec) -> TenantSpec) -> Self {
        self.tenants.push(configure(TenantSpec::new(label)));
        self
    }

    /// Timestamp of each tenant's oldest row; later rows are one minute apart.
    #[must_use]
    pub fn base_time(mut self, base_time: DateTime<Utc>) -> Self {
        self.base_time = base_time;
        self
    }

    /// Validate every row and mint users.
    pub fn build(self) -> Result<TenantFixture, FixtureError> {
        let tenants = self
            .tenants
            .into_iter()
            .map(|spec| materialise(spec, &self.run_token, self.base_time))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TenantFixture { tenants })
    }
}

fn materialise(
    spec: TenantSpec,
    run_token: &str,
    base: DateTime<Utc>,
) -> Result<TenantRows, FixtureError> {
    let user_id = UserId::random();
    let email = Email::new(format!("{}.{run_token}@isolation.invalid", spec.label))?;
    let user = User::new(user_id.clone(), email, DisplayName::new(&spec.label)?);
    let at = |index: usize| base + Duration::minutes(i64::try_from(index).unwrap_or(i64::MAX));

    let mood_entries = spec
        .moods
        .iter()
        .enumerate()
        .map(|(index, (score, note))| {
            NewMoodEntry::try_from_parts(*score, Some(note.as_str()), Some(at(index)))
                .map(|entry| entry.into_entry(user_id.clone(), at(index)))
        })
        .collect::<Result<Vec<MoodEntry>, _>>()?;

    let insights = spec
        .insights
        .iter()
        .enumerate()
        .map(|(index, insight)| {
            Insight::try_new(
                user_id.clone(),
                insight.kind,
                &insight.title,
                "",
                insight.priority,
                matches!(insight.kind, InsightKind::Recommendation),
                at(index),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let target = base.date_naive() + Duration::days(30);
    let goals = spec
        .goals
        .iter()
        .enumerate()
        .map(|(index, goal)| build_goal(&user_id, goal, target, at(index)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TenantRows {
        label: spec.label,
        account: UserAccount {
            user,
            password_digest: PasswordDigest::from_stored(UNUSABLE_DIGEST),
        },
        mood_entries,
        insights,
        goals,
    })
}

fn build_goal(
    user_id: &UserId,
    spec: &GoalSpec,
    target: NaiveDate,
    at: DateTime<Utc>,
) -> Result<Goal, FixtureError> {
    let mut goal = NewGoal::try_from_parts(&spec.title, None, spec.category, target, Priority::Low)?
        .into_goal(user_id.clone(), at);
    goal.apply_progress(GoalProgress::new(spec.progress)?, at);
    Ok(goal)
}

/// One tenant's account and seeded rows, oldest row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantRows {
    /// Label the tenant was declared with, e.g. `test-user-1`.
    pub label: String,
    /// Seeded account.
    pub account: UserAccount,
    /// Seeded mood entries.
    pub mood_entries: Vec<MoodEntry>,
    /// Seeded insights.
    pub insights: Vec<Insight>,
    /// Seeded goals.
    pub goals: Vec<Goal>,
}

impl TenantRows {
    /// Tenant's user id.
    pub fn user_id(&self) -> &UserId {
        self.account.user.id()
    }

    /// Seeded row ids for `table`, oldest first.
    pub fn row_ids(&self, table: TenantTable) -> Vec<Uuid> {
        match table {
            TenantTable::MoodEntries => self.mood_entries.iter().map(|row| row.id).collect(),
            TenantTable::Insights => self.insights.iter().map(|row| row.id).collect(),
            TenantTable::Goals => self.goals.iter().map(|row| row.id).collect(),
        }
    }
}

/// Users and rows seeded by one audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantFixture {
    tenants: Vec<TenantRows>,
}

impl TenantFixture {
    /// Start an empty builder with a fresh run token.
    pub fn builder() -> TenantFixtureBuilder {
        let run = Uuid::new_v4().simple().to_string();
        TenantFixtureBuilder {
            base_time: Utc
                .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            run_token: run.chars().take(12).collect(),
            tenants: Vec::new(),
        }
    }

    /// Two tenants: `test-user-1` with moods 8, 7, 9 and `test-user-2` with
    /// moods 6, 5, each with insights and goals.
    ///
    /// # Examples
    /// ```
    /// use mindtrack::domain::TenantFixture;
    ///
    /// let fixture = TenantFixture::standard().unwrap();
    /// let scores: Vec<i16> = fixture.tenants()[0]
    ///     .mood_entries
    ///     .iter()
    ///     .map(|entry| entry.score.value())
    ///     .collect();
    /// assert_eq!(scores, vec![8, 7, 9]);
    /// ```
    pub fn standard() -> Result<Self, FixtureError> {
        Self::builder()
            .tenant("test-user-1", |t| {
                t.mood(8, "Great day")
                    .mood(7, "Good day")
                    .mood(9, "Excellent day")
                    .insight(InsightKind::Pattern, "Morning walks lift your mood")
                    .insight(InsightKind::Celebration, "Seven day logging streak")
                    .goal("Meditate daily", GoalCategory::Mindfulness, 40)
                    .goal("Sleep by 11pm", GoalCategory::Sleep, 0)
            })
            .tenant("test-user-2", |t| {
                t.mood(6, "Okay day")
                    .mood(5, "Neutral day")
                    .insight(InsightKind::Recommendation, "Try an evening journal")
                    .goal("Call a friend weekly", GoalCategory::Social, 100)
            })
            .build()
    }

    /// `tenants` synthetic users with `rows` rows per table each. Row content
    /// is derived from `seed`; ids are fresh per call.
    pub fn synthetic(tenants: usize, rows: usize, seed: u64) -> Result<Self, FixtureError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut builder = Self::builder();
        for tenant in 0..tenants {
            let label = format!("synthetic-user-{}", tenant + 1);
            let mut spec = TenantSpec::new(&label);
            for row in 0..rows {
                let kind = InsightKind::ALL[rng.gen_range(0..InsightKind::ALL.len())];
                let category = GoalCategory::ALL[rng.gen_range(0..GoalCategory::ALL.len())];
                spec = spec
                    .mood(rng.gen_range(1..=10), &format!("synthetic note {row}"))
                    .insight(kind, &format!("Synthetic insight {row}"))
                    .goal(
                        &format!("Synthetic goal {row}"),
                        category,
                        rng.gen_range(0..=100),
                    );
            }
            builder.tenants.push(spec);
        }
        builder.build()
    }

    /// Tenants in declaration order.
    pub fn tenants(&self) -> &[TenantRows] {
        &self.tenants
    }

    /// Every tenant's user id.
    pub fn user_ids(&self) -> Vec<UserId> {
        self.tenants.iter().map(|t| t.user_id().clone()).collect()
    }

    /// Number of rows across all tenant tables, excluding accounts.
    pub fn row_count(&self) -> usize {
        self.tenants
            .iter()
            .map(|t| t.mood_entries.len() + t.insights.len() + t.goals.len())
            .sum()
    }

    /// Seeded rows of `table` across all tenants.
    pub fn expected_total(&self, table: TenantTable) -> u64 {
        let rows: usize = self.tenants.iter().map(|t| t.row_ids(table).len()).sum();
        u64::try_from(rows).unwrap_or(u64::MAX)
    }

    /// The bulk seed payload.
    pub fn to_seed(&self) -> TenantSeed {
        TenantSeed {
            users: self.tenants.iter().map(|t| t.account.clone()).collect(),
            mood_entries: self
                .tenants
                .iter()
                .flat_map(|t| t.mood_entries.iter().cloned())
                .collect(),
            insights: self
                .tenants
                .iter()
                .flat_map(|t| t.insights.iter().cloned())
                .collect(),
            goals: self
                .tenants
                .iter()
                .flat_map(|t| t.goals.iter().cloned())
                .collect(),
        }
    }
}
