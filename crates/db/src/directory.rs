//! Postgres-backed [`MemberLookup`] for the scan resolver.

use async_trait::async_trait;
use muster_core::scan::{MemberLookup, ScanMember};
use muster_core::types::DbId;
use sqlx::PgPool;

use crate::repositories::MemberRepo;

/// Member directory over the `members` and `member_tags` tables.
pub struct PgMemberDirectory<'a> {
    pool: &'a PgPool,
}

impl<'a> PgMemberDirectory<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberLookup for PgMemberDirectory<'_> {
    type Error = sqlx::Error;

    async fn find_by_tag(
        &self,
        organisation_id: DbId,
        tag: &str,
    ) -> Result<Option<ScanMember>, sqlx::Error> {
        let member = MemberRepo::find_by_tag(self.pool, organisation_id, tag).await?;
        Ok(member.map(ScanMember::from))
    }

    async fn find_by_member_number(
        &self,
        organisation_id: DbId,
        member_number: &str,
    ) -> Result<Option<ScanMember>, sqlx::Error> {
        let member =
            MemberRepo::find_by_member_number(self.pool, organisation_id, member_number).await?;
        Ok(member.map(ScanMember::from))
    }

    async fn find_active_by_mobile(
        &self,
        organisation_id: DbId,
        mobile: &str,
    ) -> Result<Vec<ScanMember>, sqlx::Error> {
        let members = MemberRepo::find_active_by_mobile(self.pool, organisation_id, mobile).await?;
        Ok(members.into_iter().map(ScanMember::from).collect())
    }

    async fn find_by_id(
        &self,
        organisation_id: DbId,
        member_id: DbId,
    ) -> Result<Option<ScanMember>, sqlx::Error> {
        let member = MemberRepo::find_regular_by_id(self.pool, organisation_id, member_id).await?;
        Ok(member.map(ScanMember::from))
    }
}
