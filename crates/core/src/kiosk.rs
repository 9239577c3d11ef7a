//! Kiosk provisioning: device bearer keys and invite passphrases.
//!
//! An admin issues an invite for a station. The invite carries a
//! human-friendly passphrase (`ember-bold-spark-4821`) that is typed once on
//! the kiosk. Registration trades the passphrase for a long random device
//! key that the kiosk then presents as a bearer token on every request.
//!
//! Neither secret is stored in plaintext: device keys are stored as SHA-256
//! digests, passphrases as HMAC-SHA256 digests keyed with a server pepper.

use rand::Rng;

use crate::hashing::{hmac_sha256_hex, sha256_hex};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a generated device key (alphanumeric characters).
pub const DEVICE_KEY_LENGTH: usize = 48;

/// Number of leading key characters stored for display.
pub const KEY_PREFIX_LENGTH: usize = 8;

/// Name given to newly registered devices.
pub const DEFAULT_DEVICE_NAME: &str = "Kiosk";

/// Invite lifetime when the admin does not choose one.
pub const DEFAULT_INVITE_DAYS: i64 = 7;

/// Longest invite lifetime an admin may choose.
pub const MAX_INVITE_DAYS: i64 = 30;

const WORDS_A: [&str; 16] = [
    "ember", "river", "forest", "silver", "tiger", "comet", "falcon", "anchor", "sunset",
    "pebble", "granite", "cedar", "willow", "quartz", "harbor", "aurora",
];

const WORDS_B: [&str; 16] = [
    "bright", "quiet", "swift", "brave", "calm", "bold", "clear", "true", "prime", "steady",
    "amber", "lucky", "noble", "vivid", "rapid", "sturdy",
];

const WORDS_C: [&str; 16] = [
    "flame", "ridge", "haven", "sprint", "pulse", "crest", "trail", "spark", "grove", "delta",
    "blaze", "peak", "drift", "flare", "dawn", "stone",
];

// ---------------------------------------------------------------------------
// Device keys
// ---------------------------------------------------------------------------

/// The result of generating a new device key.
pub struct GeneratedDeviceKey {
    /// Returned to the kiosk exactly once, never stored.
    pub plaintext: String,
    /// First [`KEY_PREFIX_LENGTH`] characters, for identifying devices in the admin UI.
    pub prefix: String,
    /// SHA-256 hex digest stored in `devices.key_hash`.
    pub hash: String,
}

/// Generate a new random device key.
pub fn generate_device_key() -> GeneratedDeviceKey {
    let key: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(DEVICE_KEY_LENGTH)
        .map(char::from)
        .collect();

    let prefix = key[..KEY_PREFIX_LENGTH].to_string();
    let hash = hash_device_key(&key);

    GeneratedDeviceKey {
        plaintext: key,
        prefix,
        hash,
    }
}

/// Digest used to look a device up by its presented key.
pub fn hash_device_key(key: &str) -> String {
    sha256_hex(key.trim().as_bytes())
}

// ---------------------------------------------------------------------------
// Invite passphrases
// ---------------------------------------------------------------------------

/// A freshly generated invite passphrase.
pub struct Passphrase {
    /// What the admin reads out / types on the kiosk.
    pub display: String,
    /// Canonical form that gets hashed.
    pub canonical: String,
}

/// Generate a `word-word-word-####` passphrase.
pub fn generate_passphrase() -> Passphrase {
    let mut rng = rand::rng();
    let a = WORDS_A[rng.random_range(0..WORDS_A.len())];
    let b = WORDS_B[rng.random_range(0..WORDS_B.len())];
    let c = WORDS_C[rng.random_range(0..WORDS_C.len())];
    let n: u16 = rng.random_range(1000..10000);

    let display = format!("{a}-{b}-{c}-{n}");
    let canonical = normalize_passphrase(&display);
    Passphrase { display, canonical }
}

/// Canonicalize typed passphrase input.
///
/// Lowercases, turns whitespace and punctuation into dashes, collapses dash
/// runs and trims leading/trailing dashes, so `" Ember Bold_Spark 4821 "`
/// and `"ember-bold-spark-4821"` hash identically.
pub fn normalize_passphrase(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('-').to_string()
}

/// Peppered digest of a passphrase, stored in `kiosk_invites.passphrase_hash`.
pub fn hash_passphrase(pepper: &str, passphrase: &str) -> String {
    hmac_sha256_hex(pepper.as_bytes(), normalize_passphrase(passphrase).as_bytes())
}

/// Masked form of a passphrase kept for the admin invite list.
///
/// Only the first word survives: `ember-bold-spark-4821` becomes `ember-****`.
pub fn passphrase_hint(display: &str) -> String {
    let first = display.split('-').next().unwrap_or_default();
    format!("{first}-****")
}

/// Clamp a requested invite lifetime to `1..=MAX_INVITE_DAYS`.
pub fn clamp_invite_days(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_INVITE_DAYS)
        .clamp(1, MAX_INVITE_DAYS)
}
