use crate::error::{CommandError, LinkError};
use url::Url;

/// Accepts any absolute URL, e.g. `https://example.com/path` or `mailto:someone@example.com`.
pub fn parse_url(text: &str) -> Result<Url, LinkError> {
    Url::parse(text)
        .map_err(|err| LinkError::invalid_argument(format!("malformed url `{text}`: {err}")))
}

pub fn parse_positive(name: &'static str, text: &str) -> Result<u32, CommandError> {
    text.parse::<u32>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| CommandError::NotPositive {
            name,
            value: text.to_string(),
        })
}
