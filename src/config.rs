use crate::encoder::MAX_CODE_LENGTH;
use crate::error::ConfigError;
use chrono::Duration;
use envconfig::Envconfig;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    /// Prepended to every code to form the short URL users see.
    #[envconfig(from = "BASE_URL", default = "http://short.link/")]
    pub base_url_prefix: String,

    #[envconfig(from = "SHORT_CODE_LENGTH", default = "8")]
    pub code_length: usize,

    #[envconfig(from = "DEFAULT_TTL_HOURS", default = "24")]
    pub default_ttl_hours: i64,

    /// Cron expression (with seconds) of the background expiry sweep.
    #[envconfig(from = "SWEEP_CRON", default = "1/60 * * * * *")]
    pub sweep_cron: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::init_from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length == 0 || self.code_length > MAX_CODE_LENGTH {
            return Err(ConfigError::InvalidCodeLength(self.code_length));
        }
        if self.default_ttl_hours <= 0 || Duration::try_hours(self.default_ttl_hours).is_none() {
            return Err(ConfigError::InvalidDefaultTtl(self.default_ttl_hours));
        }
        if self.base_url_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.sweep_cron.trim().is_empty() {
            return Err(ConfigError::EmptySweepSchedule);
        }
        Ok(())
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::try_hours(self.default_ttl_hours).unwrap_or(Duration::max_value())
    }

    pub fn short_url(&self, code: &str) -> String {
        format!("{}{}", self.base_url_prefix, code)
    }

    /// Accepts either a bare code or a full short URL.
    pub fn code_from_input<'a>(&self, input: &'a str) -> &'a str {
        input.strip_prefix(self.base_url_prefix.as_str()).unwrap_or(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn defaults() -> Config {
        Config::init_from_hashmap(&HashMap::new()).unwrap()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = defaults();
        assert_eq!(config.base_url_prefix, "http://short.link/");
        assert_eq!(config.code_length, 8);
        assert_eq!(config.default_ttl(), Duration::hours(24));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_values_from_environment() {
        let env = HashMap::from([
            ("BASE_URL".to_string(), "https://sho.rt/".to_string()),
            ("SHORT_CODE_LENGTH".to_string(), "6".to_string()),
            ("DEFAULT_TTL_HOURS".to_string(), "48".to_string()),
        ]);
        let config = Config::init_from_hashmap(&env).unwrap();
        assert_eq!(config.short_url("abc123"), "https://sho.rt/abc123");
        assert_eq!(config.code_length, 6);
        assert_eq!(config.default_ttl(), Duration::hours(48));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let too_long = Config {
            code_length: 33,
            ..defaults()
        };
        assert!(matches!(too_long.validate(), Err(ConfigError::InvalidCodeLength(33))));

        let no_ttl = Config {
            default_ttl_hours: 0,
            ..defaults()
        };
        assert!(matches!(no_ttl.validate(), Err(ConfigError::InvalidDefaultTtl(0))));

        let huge_ttl = Config {
            default_ttl_hours: i64::MAX / 3600 + 1,
            ..defaults()
        };
        assert!(matches!(huge_ttl.validate(), Err(ConfigError::InvalidDefaultTtl(_))));
        assert_eq!(huge_ttl.default_ttl(), Duration::max_value());

        let no_base = Config {
            base_url_prefix: " ".to_string(),
            ..defaults()
        };
        assert!(matches!(no_base.validate(), Err(ConfigError::EmptyBaseUrl)));
    }

    #[test]
    fn strips_base_url_from_input() {
        let config = defaults();
        assert_eq!(config.code_from_input("http://short.link/abc"), "abc");
        assert_eq!(config.code_from_input("abc"), "abc");
    }
}
