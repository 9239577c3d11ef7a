//! Kiosk scan resolution.
//!
//! A kiosk submits whatever was typed or wedge-scanned. The resolver decides
//! what kind of identifier it is and finds the member it belongs to:
//!
//! 1. Input with any non-digit character is tried as an RFID tag.
//! 2. Digits-only input is tried as a member (fireground) number.
//! 3. Anything not matched so far is normalized as an AU mobile and matched
//!    against active members' normalized mobiles. Several members may share
//!    a mobile, in which case the kiosk gets the full candidate list and
//!    re-submits through [`resolve_member_id`].
//!
//! Storage is reached only through [`MemberLookup`], which the database
//! crate implements over Postgres and the tests below implement in memory.

use async_trait::async_trait;
use serde::Serialize;

use crate::member::MEMBER_ACTIVE;
use crate::phone::normalize_au_mobile;
use crate::types::DbId;

/// Shape of a raw scan string, decided before any lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// Blank input; nothing to look up.
    Empty,
    /// Contains at least one non-digit: tag first, then mobile.
    Tag,
    /// Digits only: member number first, then mobile.
    Number,
}

/// Classify trimmed scan input.
pub fn classify(input: &str) -> ScanKind {
    if input.is_empty() {
        ScanKind::Empty
    } else if input.bytes().all(|b| b.is_ascii_digit()) {
        ScanKind::Number
    } else {
        ScanKind::Tag
    }
}

/// The member fields the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMember {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub member_number: String,
    pub status: String,
}

impl ScanMember {
    pub fn is_active(&self) -> bool {
        self.status == MEMBER_ACTIVE
    }
}

/// One of several members sharing a scanned mobile number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub member_number: String,
}

impl From<&ScanMember> for Candidate {
    fn from(m: &ScanMember) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name.clone(),
            last_name: m.last_name.clone(),
            member_number: m.member_number.clone(),
        }
    }
}

/// Which identifier matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    Tag,
    MemberNumber,
    Mobile,
    MemberId,
}

impl MatchedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchedBy::Tag => "tag",
            MatchedBy::MemberNumber => "member_number",
            MatchedBy::Mobile => "mobile",
            MatchedBy::MemberId => "member_id",
        }
    }
}

/// Outcome of resolving a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No member matched. Routine for mis-scans; not an error.
    Unknown,
    /// A member matched but is not active.
    Disabled { member_id: DbId },
    /// Two or more active members share the scanned mobile.
    Ambiguous(Vec<Candidate>),
    /// Exactly one active member matched.
    Resolved {
        member: ScanMember,
        matched_by: MatchedBy,
    },
}

/// Storage access used by the resolver.
///
/// Every method is scoped to one organisation and must only return
/// non-visitor members.
#[async_trait]
pub trait MemberLookup: Send + Sync {
    type Error: Send;

    /// Member bound to an *active* tag with exactly this value.
    async fn find_by_tag(
        &self,
        organisation_id: DbId,
        tag: &str,
    ) -> Result<Option<ScanMember>, Self::Error>;

    /// Member with exactly this member number, whatever their status.
    async fn find_by_member_number(
        &self,
        organisation_id: DbId,
        member_number: &str,
    ) -> Result<Option<ScanMember>, Self::Error>;

    /// All *active* members whose normalized mobile equals `mobile`.
    async fn find_active_by_mobile(
        &self,
        organisation_id: DbId,
        mobile: &str,
    ) -> Result<Vec<ScanMember>, Self::Error>;

    /// Member with this id, whatever their status.
    async fn find_by_id(
        &self,
        organisation_id: DbId,
        member_id: DbId,
    ) -> Result<Option<ScanMember>, Self::Error>;
}

/// Resolve raw kiosk input to a member.
pub async fn resolve_scan<L>(
    lookup: &L,
    organisation_id: DbId,
    raw: &str,
) -> Result<Resolution, L::Error>
where
    L: MemberLookup + ?Sized,
{
    let input = raw.trim();

    match classify(input) {
        ScanKind::Empty => return Ok(Resolution::Unknown),
        ScanKind::Tag => {
            if let Some(member) = lookup.find_by_tag(organisation_id, input).await? {
                return Ok(gate(member, MatchedBy::Tag));
            }
        }
        ScanKind::Number => {
            if let Some(member) = lookup
                .find_by_member_number(organisation_id, input)
                .await?
            {
                return Ok(gate(member, MatchedBy::MemberNumber));
            }
        }
    }

    let Some(mobile) = normalize_au_mobile(input) else {
        return Ok(Resolution::Unknown);
    };

    let mut matches = lookup.find_active_by_mobile(organisation_id, &mobile).await?;
    matches.retain(ScanMember::is_active);

    Ok(match matches.len() {
        0 => Resolution::Unknown,
        1 => Resolution::Resolved {
            member: matches.remove(0),
            matched_by: MatchedBy::Mobile,
        },
        _ => {
            matches.sort_by(|a, b| {
                (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
            });
            Resolution::Ambiguous(matches.iter().map(Candidate::from).collect())
        }
    })
}

/// Resolve an explicit member choice made after an ambiguous scan.
pub async fn resolve_member_id<L>(
    lookup: &L,
    organisation_id: DbId,
    member_id: DbId,
) -> Result<Resolution, L::Error>
where
    L: MemberLookup + ?Sized,
{
    Ok(match lookup.find_by_id(organisation_id, member_id).await? {
        Some(member) => gate(member, MatchedBy::MemberId),
        None => Resolution::Unknown,
    })
}

fn gate(member: ScanMember, matched_by: MatchedBy) -> Resolution {
    if member.is_active() {
        Resolution::Resolved { member, matched_by }
    } else {
        Resolution::Disabled {
            member_id: member.id,
        }
    }
}
