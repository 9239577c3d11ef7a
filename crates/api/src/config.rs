//! Process configuration, read once at startup from the environment (after
//! `dotenvy` has loaded any `.env` file).

use std::fmt::Debug;
use std::str::FromStr;

use muster_core::attendance::DEFAULT_MINUTES_TOLERANCE;

use crate::auth::jwt::JwtConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Admin UI origins allowed by CORS.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub kiosk: KioskConfig,
}

impl ServerConfig {
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    ///
    /// Plus everything read by [`JwtConfig::from_env`] and
    /// [`KioskConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on a missing required variable or an unparsable number.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_var("PORT", 3000),
            cors_origins,
            request_timeout_secs: parsed_var("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parsed_var("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            kiosk: KioskConfig::from_env(),
        }
    }
}

/// Kiosk provisioning and checkout settings.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Secret mixed into invite passphrase digests. Changing it invalidates
    /// every outstanding invite.
    pub invite_pepper: String,
    /// Minutes a kiosk-claimed duration may exceed the measured one.
    pub checkout_tolerance_mins: i64,
}

impl KioskConfig {
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `KIOSK_INVITE_PEPPER`     | **yes**  | --      |
    /// | `CHECKOUT_TOLERANCE_MINS` | no       | `5`     |
    pub fn from_env() -> Self {
        let invite_pepper = std::env::var("KIOSK_INVITE_PEPPER")
            .ok()
            .filter(|v| !v.is_empty())
            .expect("KIOSK_INVITE_PEPPER must be set to a non-empty value");

        Self {
            invite_pepper,
            checkout_tolerance_mins: parsed_var(
                "CHECKOUT_TOLERANCE_MINS",
                DEFAULT_MINUTES_TOLERANCE,
            ),
        }
    }
}

/// `key` parsed as `T`, or `default` when unset.
pub(crate) fn parsed_var<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid number: {e:?}")),
        Err(_) => default,
    }
}
