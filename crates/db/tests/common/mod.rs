//! Fixture builders shared by the repository tests.

#![allow(dead_code)]

use muster_core::kiosk::generate_device_key;
use muster_core::phone::normalize_au_mobile;
use muster_core::types::DbId;
use muster_db::models::category::{Category, NewCategory};
use muster_db::models::device::{Device, NewDevice, NewInvite};
use muster_db::models::member::{Member, NewMember};
use muster_db::models::organisation::{CreateStation, Station};
use muster_db::repositories::{CategoryRepo, InviteRepo, MemberRepo, OrganisationRepo, StationRepo};
use sqlx::PgPool;

pub struct Fixture {
    pub organisation_id: DbId,
    pub station: Station,
    pub device: Device,
}

pub async fn fixture(pool: &PgPool) -> Fixture {
    let org = OrganisationRepo::create(pool, "Test Brigade", "Australia/Sydney")
        .await
        .unwrap();
    let station = StationRepo::create(
        pool,
        org.id,
        &CreateStation {
            name: "Central".to_string(),
            code: "CEN".to_string(),
        },
    )
    .await
    .unwrap();
    let device = device(pool, org.id, station.id).await;
    Fixture {
        organisation_id: org.id,
        station,
        device,
    }
}

pub async fn device(pool: &PgPool, organisation_id: DbId, station_id: DbId) -> Device {
    let invite = InviteRepo::create(
        pool,
        &NewInvite {
            organisation_id,
            station_id,
            passphrase_hash: format!("hash-{}", generate_device_key().plaintext),
            phrase_display: "ember-bold-spark-1234".to_string(),
            expires_at: chrono::Utc::now() + chrono::Duration::days(7),
            created_by: None,
        },
    )
    .await
    .unwrap();
    let key = generate_device_key();
    InviteRepo::redeem(
        pool,
        invite.id,
        &NewDevice {
            name: "Kiosk".to_string(),
            key_hash: key.hash,
            key_prefix: key.prefix,
        },
    )
    .await
    .unwrap()
    .unwrap()
}

pub async fn member(
    pool: &PgPool,
    organisation_id: DbId,
    number: &str,
    first: &str,
    last: &str,
    mobile: Option<&str>,
) -> Member {
    MemberRepo::create(
        pool,
        &NewMember {
            organisation_id,
            member_number: number.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            mobile: mobile.map(str::to_string),
            mobile_normalized: mobile.and_then(normalize_au_mobile),
            status: "active".to_string(),
        },
        None,
    )
    .await
    .unwrap()
}

pub async fn category(
    pool: &PgPool,
    organisation_id: DbId,
    parent_id: Option<DbId>,
    code: &str,
    name: &str,
) -> Category {
    let sort = CategoryRepo::next_sort(pool, organisation_id, parent_id)
        .await
        .unwrap();
    CategoryRepo::create(
        pool,
        &NewCategory {
            organisation_id,
            parent_id,
            code: code.to_string(),
            name: name.to_string(),
            sort,
        },
    )
    .await
    .unwrap()
}
