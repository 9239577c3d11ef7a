//! First-run seeding of an empty database.
//!
//! When no organisation exists and `ADMIN_USERNAME` / `ADMIN_PASSWORD` are
//! set, creates one organisation, a default station and an owner account so
//! the admin UI can be used to provision everything else.

use muster_core::roles::ROLE_OWNER;
use muster_db::models::admin::NewAdminUser;
use muster_db::models::organisation::CreateStation;
use muster_db::repositories::{AdminUserRepo, OrganisationRepo, StationRepo};
use muster_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};

const DEFAULT_ORG_NAME: &str = "Fire Brigade";
const DEFAULT_ORG_TIMEZONE: &str = "Australia/Sydney";
const DEFAULT_STATION_NAME: &str = "Main Station";
const DEFAULT_STATION_CODE: &str = "MAIN";

/// Seed settings read from the environment.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub admin_username: String,
    pub admin_password: String,
    pub admin_email: String,
    pub org_name: String,
    pub org_timezone: String,
}

impl BootstrapConfig {
    /// Load seed settings. Returns `None` unless both `ADMIN_USERNAME` and
    /// `ADMIN_PASSWORD` are set and non-empty.
    ///
    /// | Env Var                  | Default             |
    /// |--------------------------|---------------------|
    /// | `ADMIN_USERNAME`         | --                  |
    /// | `ADMIN_PASSWORD`         | --                  |
    /// | `ADMIN_EMAIL`            | `<username>@localhost` |
    /// | `BOOTSTRAP_ORG_NAME`     | `Fire Brigade`      |
    /// | `BOOTSTRAP_ORG_TIMEZONE` | `Australia/Sydney`  |
    pub fn from_env() -> Option<Self> {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let admin_username = non_empty("ADMIN_USERNAME")?;
        let admin_password = non_empty("ADMIN_PASSWORD")?;
        let admin_email =
            non_empty("ADMIN_EMAIL").unwrap_or_else(|| format!("{admin_username}@localhost"));

        Some(Self {
            admin_username,
            admin_password,
            admin_email,
            org_name: non_empty("BOOTSTRAP_ORG_NAME").unwrap_or_else(|| DEFAULT_ORG_NAME.into()),
            org_timezone: non_empty("BOOTSTRAP_ORG_TIMEZONE")
                .unwrap_or_else(|| DEFAULT_ORG_TIMEZONE.into()),
        })
    }
}

/// Seed the database if it has no organisations. Returns `true` if it did.
pub async fn seed_if_empty(pool: &DbPool, config: &BootstrapConfig) -> AppResult<bool> {
    if OrganisationRepo::count(pool).await? > 0 {
        return Ok(false);
    }

    validate_password_strength(&config.admin_password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::BadRequest)?;
    let password_hash = hash_password(&config.admin_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let organisation = OrganisationRepo::create(pool, &config.org_name, &config.org_timezone).await?;
    let station = StationRepo::create(
        pool,
        organisation.id,
        &CreateStation {
            name: DEFAULT_STATION_NAME.into(),
            code: DEFAULT_STATION_CODE.into(),
        },
    )
    .await?;
    let owner = AdminUserRepo::create(
        pool,
        &NewAdminUser {
            organisation_id: organisation.id,
            username: config.admin_username.clone(),
            email: config.admin_email.clone(),
            password_hash,
            role: ROLE_OWNER.into(),
        },
    )
    .await?;

    tracing::info!(
        organisation_id = organisation.id,
        station_id = station.id,
        admin_id = owner.id,
        "Seeded empty database with first organisation",
    );
    Ok(true)
}
