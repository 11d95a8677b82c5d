use crate::encoder::{generate_code_attempt, MAX_CODE_LENGTH};
use crate::error::{ConfigError, LinkError};
use crate::identity::Owner;
use crate::model::Link;
use crate::utils::parse_url;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Candidates tried per `create` before giving up on a free code.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// In-memory store of links keyed by short code.
///
/// Every operation runs as one critical section under a single map lock, so no
/// caller observes a half-updated link and sweeps never interleave with inserts.
/// Callers get clones; all mutation goes through the methods below.
pub struct LinkRegistry {
    links: Mutex<HashMap<String, Link>>,
    code_length: usize,
}

impl LinkRegistry {
    pub fn new(code_length: usize) -> Result<Self, ConfigError> {
        if code_length == 0 || code_length > MAX_CODE_LENGTH {
            return Err(ConfigError::InvalidCodeLength(code_length));
        }
        Ok(Self {
            links: Mutex::new(HashMap::new()),
            code_length,
        })
    }

    /// Creates a link under a code derived from `original_url` and `owner`.
    ///
    /// A code held by a live link is never overwritten: the attempt counter is
    /// appended to the digest input until a free code turns up. A code held by an
    /// expired link is reclaimed.
    pub fn create(
        &self,
        original_url: &str,
        owner: Owner,
        max_clicks: u32,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Link, LinkError> {
        Link::validate(original_url, max_clicks, ttl)?;
        parse_url(original_url)?;

        let mut links = self.links.lock();
        for attempt in 0..MAX_GENERATION_ATTEMPTS {
            let code = generate_code_attempt(original_url, &owner, attempt, self.code_length);
            evict_if_expired(&mut links, &code, now);
            if links.contains_key(&code) {
                tracing::warn!(code = %code, attempt, "Short code already taken, regenerating");
                continue;
            }
            let link = Link::new(original_url, &code, owner, max_clicks, ttl, now)?;
            links.insert(code.clone(), link.clone());
            tracing::debug!(code = %code, %owner, max_clicks, "Link created");
            return Ok(link);
        }
        tracing::error!(
            "Could not create link. Exhausted all {} attempts of generating a free code",
            MAX_GENERATION_ATTEMPTS
        );
        Err(LinkError::CodeGenerationExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Follows a short code, counting one click.
    ///
    /// Not idempotent: every successful call increments `used_clicks`. Returns
    /// `None` when the code is unknown, when the link has expired (the link is
    /// removed on the spot) or when its quota is used up (the link stays in place).
    pub fn resolve(&self, code: &str, now: DateTime<Utc>) -> Option<Link> {
        let mut links = self.links.lock();
        if evict_if_expired(&mut links, code, now) {
            return None;
        }
        let link = links.get_mut(code)?;
        if link.is_limit_reached() {
            tracing::debug!(code, "Click limit reached");
            return None;
        }
        link.record_click();
        tracing::debug!(code, used_clicks = link.used_clicks(), "Link resolved");
        Some(link.clone())
    }

    /// All links of `owner`, expired or exhausted ones included, in no particular order.
    pub fn find_by_owner(&self, owner: &Owner) -> Vec<Link> {
        self.links
            .lock()
            .values()
            .filter(|link| link.is_owned_by(owner))
            .cloned()
            .collect()
    }

    /// Raw lookup without side effects or expiry/limit filtering.
    pub fn find_by_code(&self, code: &str) -> Option<Link> {
        self.links.lock().get(code).cloned()
    }

    /// Returns `false` when the code is unknown, `owner` does not own the link or
    /// `max_clicks` is zero.
    pub fn update_max_clicks(&self, code: &str, max_clicks: u32, owner: &Owner) -> bool {
        if max_clicks == 0 {
            return false;
        }
        self.update_owned(code, owner, |link| link.set_max_clicks(max_clicks))
    }

    /// Returns `false` when the code is unknown, `owner` does not own the link or
    /// `ttl` is not positive.
    pub fn update_ttl(&self, code: &str, ttl: Duration, owner: &Owner) -> bool {
        if ttl <= Duration::zero() {
            return false;
        }
        self.update_owned(code, owner, |link| link.set_ttl(ttl))
    }

    /// Removes the link if present. Unknown codes are ignored.
    pub fn delete(&self, code: &str) {
        if self.links.lock().remove(code).is_some() {
            tracing::debug!(code, "Link deleted");
        }
    }

    /// Removes the link only when it exists and belongs to `owner`.
    pub fn delete_owned(&self, code: &str, owner: &Owner) -> bool {
        let mut links = self.links.lock();
        let owned = links.get(code).is_some_and(|link| link.is_owned_by(owner));
        if owned {
            links.remove(code);
            tracing::debug!(code, %owner, "Link deleted by owner");
        }
        owned
    }

    /// Removes every link expired at `now` and returns how many were removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut links = self.links.lock();
        let codes: Vec<String> = links.keys().cloned().collect();
        let removed = codes
            .iter()
            .filter(|code| evict_if_expired(&mut links, code, now))
            .count();
        if removed > 0 {
            tracing::info!(removed, remaining = links.len(), "Expired links swept");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.links.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.lock().is_empty()
    }

    fn update_owned<F>(&self, code: &str, owner: &Owner, update: F) -> bool
    where
        F: FnOnce(&mut Link),
    {
        let mut links = self.links.lock();
        match links.get_mut(code) {
            Some(link) if link.is_owned_by(owner) => {
                update(link);
                tracing::debug!(code, %owner, "Link updated");
                true
            }
            Some(_) => {
                tracing::debug!(code, %owner, "Rejected update from non-owner");
                false
            }
            None => false,
        }
    }
}

/// Shared by lazy expiry on resolve/create and by the sweep.
fn evict_if_expired(links: &mut HashMap<String, Link>, code: &str, now: DateTime<Utc>) -> bool {
    let expired = links.get(code).is_some_and(|link| link.is_expired(now));
    if expired {
        links.remove(code);
        tracing::debug!(code, "Expired link removed");
    }
    expired
}
