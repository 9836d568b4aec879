//! CSRF token store
//!
//! Keeps outstanding anti-forgery grants in memory. Each grant pairs a random
//! session id (the lookup key) with a random token (the secret). Grants live
//! for a fixed ttl and are swept lazily whenever a new one is issued.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

/// Default grant lifetime (1 hour)
pub const DEFAULT_CSRF_TTL_SECS: i64 = 3600;

/// Longest accepted grant lifetime (1 week)
pub const MAX_CSRF_TTL_SECS: i64 = 7 * 24 * 3600;

const TOKEN_BYTES: usize = 32;
const SESSION_ID_BYTES: usize = 16;

/// A stored grant
#[derive(Debug, Clone)]
struct CsrfEntry {
    token: String,
    issued_at: DateTime<Utc>,
}

/// Token/session pair handed to the client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfGrant {
    pub token: String,
    pub session_id: String,
}

/// Outcome of checking a presented token/session pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfVerdict {
    Valid,
    Missing,
    Mismatch,
    Expired,
}

pub struct CsrfStore {
    /// session id -> grant
    entries: RwLock<HashMap<String, CsrfEntry>>,
    ttl: Duration,
}

impl Default for CsrfStore {
    fn default() -> Self {
        Self::new(DEFAULT_CSRF_TTL_SECS)
    }
}

impl CsrfStore {
    /// `ttl_secs` is clamped to `1..=MAX_CSRF_TTL_SECS`
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs.clamp(1, MAX_CSRF_TTL_SECS)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a new grant stamped with the current time
    pub async fn issue(&self) -> CsrfGrant {
        self.issue_at(Utc::now()).await
    }

    /// Issue a new grant stamped with `now`.
    ///
    /// Expired grants are swept under the same write lock before the new one
    /// is inserted.
    pub async fn issue_at(&self, now: DateTime<Utc>) -> CsrfGrant {
        let token = random_hex(TOKEN_BYTES);

        let mut entries = self.entries.write().await;
        let swept = Self::sweep_locked(&mut entries, now, self.ttl);
        if swept > 0 {
            tracing::debug!("Swept {} expired CSRF grants", swept);
        }

        // 128-bit ids never collide in practice, but a duplicate must not
        // overwrite a live grant.
        let mut session_id = random_hex(SESSION_ID_BYTES);
        while entries.contains_key(&session_id) {
            session_id = random_hex(SESSION_ID_BYTES);
        }

        entries.insert(
            session_id.clone(),
            CsrfEntry {
                token: token.clone(),
                issued_at: now,
            },
        );

        CsrfGrant { token, session_id }
    }

    /// Check a presented pair against the current time
    pub async fn verify(&self, session_id: &str, token: &str) -> CsrfVerdict {
        self.verify_at(Utc::now(), session_id, token).await
    }

    /// Check a presented pair as of `now`.
    ///
    /// A live match leaves the grant in place, so the same pair may be
    /// presented again until it expires. An expired grant is removed.
    pub async fn verify_at(&self, now: DateTime<Utc>, session_id: &str, token: &str) -> CsrfVerdict {
        let verdict = {
            let entries = self.entries.read().await;
            match entries.get(session_id) {
                None => return CsrfVerdict::Missing,
                Some(entry) if self.is_expired(entry, now) => CsrfVerdict::Expired,
                Some(entry) if tokens_match(&entry.token, token) => CsrfVerdict::Valid,
                Some(_) => CsrfVerdict::Mismatch,
            }
        };

        if verdict == CsrfVerdict::Expired {
            let mut entries = self.entries.write().await;
            let still_expired = entries
                .get(session_id)
                .map(|entry| self.is_expired(entry, now))
                .unwrap_or(false);
            if still_expired {
                entries.remove(session_id);
            }
        }

        verdict
    }

    /// Remove every grant whose age has reached the ttl
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        Self::sweep_locked(&mut entries, now, self.ttl)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_expired(&self, entry: &CsrfEntry, now: DateTime<Utc>) -> bool {
        now - entry.issued_at >= self.ttl
    }

    fn sweep_locked(entries: &mut HashMap<String, CsrfEntry>, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| now - entry.issued_at < ttl);
        before - entries.len()
    }
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn tokens_match(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}
