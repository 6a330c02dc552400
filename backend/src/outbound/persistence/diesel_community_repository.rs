//! PostgreSQL adapters for support groups and the therapist directory.
//!
//! Member counts are never stored; they are counted from
//! `support_group_members`. Joins lock the group row so two concurrent joins
//! cannot both take the last place.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CommunityRepositoryError, SupportGroupRepository, TherapistRepository};
use crate::domain::{ContactRequest, SupportGroup, Therapist, UserId};

use super::diesel_helpers::{collect_rows, map_diesel_error, map_pool_error};
use super::models::{ContactRequestRow, SupportGroupRow, TherapistRow};
use super::pool::DbPool;
use super::schema::{contact_requests, support_group_members, support_groups, therapists};

/// Failure inside a membership transaction.
#[derive(Debug)]
enum MembershipError {
    Database(diesel::result::Error),
    Rejected(CommunityRepositoryError),
}

impl From<diesel::result::Error> for MembershipError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

impl From<MembershipError> for CommunityRepositoryError {
    fn from(error: MembershipError) -> Self {
        match error {
            MembershipError::Database(err) => map_diesel_error(err),
            MembershipError::Rejected(err) => err,
        }
    }
}

async fn member_counts(
    conn: &mut AsyncPgConnection,
    group_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, diesel::result::Error> {
    let counts: Vec<(Uuid, i64)> = support_group_members::table
        .filter(support_group_members::group_id.eq_any(group_ids))
        .group_by(support_group_members::group_id)
        .select((
            support_group_members::group_id,
            diesel::dsl::count(support_group_members::user_id),
        ))
        .load(conn)
        .await?;
    Ok(counts.into_iter().collect())
}

async fn with_counts(
    conn: &mut AsyncPgConnection,
    rows: Vec<SupportGroupRow>,
) -> Result<Vec<SupportGroup>, diesel::result::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let counts = member_counts(conn, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let count = counts.get(&row.id).copied().unwrap_or_default();
            row.with_members(count)
        })
        .collect())
}

async fn locked_group(
    conn: &mut AsyncPgConnection,
    group_id: Uuid,
) -> Result<SupportGroup, MembershipError> {
    let row = support_groups::table
        .find(group_id)
        .select(SupportGroupRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| MembershipError::Rejected(CommunityRepositoryError::not_found(group_id)))?;
    let count: i64 = support_group_members::table
        .filter(support_group_members::group_id.eq(group_id))
        .count()
        .get_result(conn)
        .await?;
    Ok(row.with_members(count))
}

/// Diesel-backed community repository serving both community ports.
#[derive(Clone)]
pub struct DieselCommunityRepository {
    pool: DbPool,
}

impl DieselCommunityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupportGroupRepository for DieselCommunityRepository {
    async fn list(&self) -> Result<Vec<SupportGroup>, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<CommunityRepositoryError>)?;
        let rows: Vec<SupportGroupRow> = support_groups::table
            .select(SupportGroupRow::as_select())
            .order(support_groups::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error::<CommunityRepositoryError>)?;
        with_counts(&mut conn, rows).await.map_err(map_diesel_error)
    }

    async fn list_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SupportGroup>, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<CommunityRepositoryError>)?;
        let rows: Vec<SupportGroupRow> = support_groups::table
            .inner_join(support_group_members::table)
            .filter(support_group_members::user_id.eq(*user_id.as_uuid()))
            .select(SupportGroupRow::as_select())
            .order(support_groups::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error::<CommunityRepositoryError>)?;
        with_counts(&mut conn, rows).await.map_err(map_diesel_error)
    }

    async fn join(
        &self,
        user_id: &UserId,
        group_id: Uuid,
    ) -> Result<SupportGroup, CommunityRepositoryError> {
        let member = *user_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error::<CommunityRepositoryError>)?;
        let group = conn
            .transaction::<_, MembershipError, _>(|conn| {
                async move {
                    let group = locked_group(conn, group_id).await?;
                    let already: i64 = support_group_members::table
                        .filter(support_group_members::group_id.eq(group_id))
                        .filter(support_group_members::user_id.eq(member))
                        .count()
                        .get_result(conn)
                        .await?;
                    if already > 0 {
                        return Err(MembershipError::Rejected(
                            CommunityRepositoryError::already_member(group_id),
                        ));
                    }
                    if !group.has_room() {
                        return Err(MembershipError::Rejected(
                            CommunityRepositoryError::group_full(group_id),
                        ));
                    }
                    diesel::insert_into(support_group_members::table)
                        .values((
                            support_group_members::group_id.eq(group_id),
                            support_group_members::user_id.eq(member),
                        ))
                        .execute(conn)
                        .await?;
                    Ok(SupportGroup {
                        member_count: group.member_count + 1,
                        ..group
                    })
                }
                .scope_boxed()
            })
            .await?;
        Ok(group)
    }

    async fn leave(
        &self,
        user_id: &UserId,
        group_id: Uuid,
    ) -> Result<SupportGroup, CommunityRepositoryError> {
        let member = *user_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error::<CommunityRepositoryError>)?;
        let group = conn
            .transaction::<_, MembershipError, _>(|conn| {
                async move {
                    locked_group(conn, group_id).await?;
                    let removed = diesel::delete(
                        support_group_members::table
                            .filter(support_group_members::group_id.eq(group_id))
                            .filter(support_group_members::user_id.eq(member)),
                    )
                    .execute(conn)
                    .await?;
                    if removed == 0 {
                        return Err(MembershipError::Rejected(
                            CommunityRepositoryError::not_member(group_id),
                        ));
                    }
                    locked_group(conn, group_id).await
                }
                .scope_boxed()
            })
            .await?;
        Ok(group)
    }
}

#[async_trait]
impl TherapistRepository for DieselCommunityRepository {
    async fn list(&self) -> Result<Vec<Therapist>, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<CommunityRepositoryError>)?;
        let rows: Vec<TherapistRow> = therapists::table
            .select(TherapistRow::as_select())
            .order(therapists::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error::<CommunityRepositoryError>)?;
        Ok(rows.into_iter().map(Therapist::from).collect())
    }

    async fn find(
        &self,
        therapist_id: Uuid,
    ) -> Result<Option<Therapist>, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<CommunityRepositoryError>)?;
        let row = therapists::table
            .find(therapist_id)
            .select(TherapistRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<CommunityRepositoryError>)?;
        Ok(row.map(Therapist::from))
    }

    async fn insert_contact_request(
        &self,
        request: &ContactRequest,
    ) -> Result<(), CommunityRepositoryError> {
        if TherapistRepository::find(self, request.therapist_id).await?.is_none() {
            return Err(CommunityRepositoryError::not_found(request.therapist_id));
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error::<CommunityRepositoryError>)?;
        diesel::insert_into(contact_requests::table)
            .values(ContactRequestRow::from(request))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_contact_requests(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ContactRequest>, CommunityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<CommunityRepositoryError>)?;
        let rows: Vec<ContactRequestRow> = contact_requests::table
            .filter(contact_requests::user_id.eq(*user_id.as_uuid()))
            .select(ContactRequestRow::as_select())
            .order((contact_requests::created_at.desc(), contact_requests::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error::<CommunityRepositoryError>)?;
        collect_rows(
            rows.into_iter().map(ContactRequestRow::into_domain),
            CommunityRepositoryError::query,
        )
    }
}
