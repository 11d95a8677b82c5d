use crate::error::LinkError;
use crate::identity::Owner;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A short code bound to a target URL, with a click quota and a time-to-live.
///
/// `original_url`, `short_code`, `owner` and `created_at` never change after
/// construction. `max_clicks` and `ttl` are replaced only through the registry,
/// which validates the new values; `used_clicks` only grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    original_url: String,
    short_code: String,
    owner: Owner,
    max_clicks: u32,
    used_clicks: u32,
    created_at: DateTime<Utc>,
    #[serde(with = "ttl_millis")]
    ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkStatus {
    Active,
    LimitReached,
    Expired,
}

impl Link {
    pub fn new(
        original_url: &str,
        short_code: &str,
        owner: Owner,
        max_clicks: u32,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, LinkError> {
        Self::validate(original_url, max_clicks, ttl)?;
        Ok(Self {
            original_url: original_url.to_string(),
            short_code: short_code.to_string(),
            owner,
            max_clicks,
            used_clicks: 0,
            created_at: now,
            ttl,
        })
    }

    pub(crate) fn validate(
        original_url: &str,
        max_clicks: u32,
        ttl: Duration,
    ) -> Result<(), LinkError> {
        if original_url.is_empty() {
            return Err(LinkError::invalid_argument("original url must not be empty"));
        }
        if max_clicks == 0 {
            return Err(LinkError::invalid_argument("max clicks must be positive"));
        }
        if ttl <= Duration::zero() {
            return Err(LinkError::invalid_argument("ttl must be positive"));
        }
        Ok(())
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn short_code(&self) -> &str {
        &self.short_code
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn max_clicks(&self) -> u32 {
        self.max_clicks
    }

    pub fn used_clicks(&self) -> u32 {
        self.used_clicks
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// `None` when `created_at + ttl` lies beyond the last representable instant;
    /// such a link never expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.checked_add_signed(self.ttl)
    }

    pub fn remaining_clicks(&self) -> u32 {
        self.max_clicks.saturating_sub(self.used_clicks)
    }

    pub fn is_owned_by(&self, owner: &Owner) -> bool {
        self.owner == *owner
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| now >= expires_at)
    }

    pub fn is_limit_reached(&self) -> bool {
        self.used_clicks >= self.max_clicks
    }

    /// Expiry wins over an exhausted quota.
    pub fn status(&self, now: DateTime<Utc>) -> LinkStatus {
        if self.is_expired(now) {
            LinkStatus::Expired
        } else if self.is_limit_reached() {
            LinkStatus::LimitReached
        } else {
            LinkStatus::Active
        }
    }

    /// Counts one click. The caller has already checked expiry and quota.
    pub(crate) fn record_click(&mut self) {
        self.used_clicks = self.used_clicks.saturating_add(1);
    }

    pub(crate) fn set_max_clicks(&mut self, max_clicks: u32) {
        self.max_clicks = max_clicks;
    }

    pub(crate) fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }
}

mod ttl_millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(ttl.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(Duration::milliseconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(max_clicks: u32, ttl: Duration, now: DateTime<Utc>) -> Link {
        Link::new("https://example.com", "abc123", Owner::random(), max_clicks, ttl, now).unwrap()
    }

    #[test]
    fn rejects_invalid_arguments() {
        let now = Utc::now();
        let owner = Owner::random();
        for (url, max_clicks, ttl) in [
            ("", 1, Duration::hours(1)),
            ("https://example.com", 0, Duration::hours(1)),
            ("https://example.com", 1, Duration::zero()),
            ("https://example.com", 1, Duration::hours(-1)),
        ] {
            let result = Link::new(url, "abc", owner, max_clicks, ttl, now);
            assert!(matches!(result, Err(LinkError::InvalidArgument(_))));
        }
    }

    #[test]
    fn expires_exactly_at_created_at_plus_ttl() {
        let now = Utc::now();
        let link = link(1, Duration::milliseconds(100), now);
        assert!(!link.is_expired(now + Duration::milliseconds(99)));
        assert!(link.is_expired(now + Duration::milliseconds(100)));
        assert_eq!(link.expires_at(), Some(now + Duration::milliseconds(100)));
    }

    #[test]
    fn ttl_past_the_calendar_never_expires() {
        let now = Utc::now();
        let link = link(1, Duration::days(200_000_000), now);
        assert_eq!(link.expires_at(), None);
        assert!(!link.is_expired(now));
        assert!(!link.is_expired(DateTime::<Utc>::MAX_UTC));
        assert_eq!(link.status(now), LinkStatus::Active);
    }

    #[test]
    fn limit_is_reached_after_max_clicks() {
        let now = Utc::now();
        let mut link = link(2, Duration::hours(24), now);
        link.record_click();
        assert!(!link.is_limit_reached());
        assert_eq!(link.remaining_clicks(), 1);
        link.record_click();
        assert!(link.is_limit_reached());
        assert_eq!(link.status(now), LinkStatus::LimitReached);
    }

    #[test]
    fn expired_status_takes_precedence() {
        let now = Utc::now();
        let mut link = link(1, Duration::hours(1), now);
        link.record_click();
        assert_eq!(link.status(now + Duration::hours(2)), LinkStatus::Expired);
    }

    #[test]
    fn serializes_ttl_as_milliseconds() {
        let link = link(3, Duration::seconds(90), Utc::now());
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["ttl"], 90_000);
        assert_eq!(json["maxClicks"], 3);
        assert_eq!(json["usedClicks"], 0);
        let back: Link = serde_json::from_value(json).unwrap();
        assert_eq!(back, link);
    }
}
