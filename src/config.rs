//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default remote API used when `STYLE_ONBOARD_API_BASE_URL` is not set.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Selection bounds for the tag and outfit steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnboardingLimits {
    /// Minimum number of style tags required to leave the tag step.
    pub min_tags: usize,
    /// Maximum number of style tags that can be selected.
    pub max_tags: usize,
    /// Exact number of sample outfits that must be selected.
    pub required_outfits: usize,
    /// Sample outfits shown per page on the outfit step.
    pub outfits_per_page: usize,
}

impl Default for OnboardingLimits {
    fn default() -> Self {
        Self {
            min_tags: 3,
            max_tags: 10,
            required_outfits: 10,
            outfits_per_page: 10,
        }
    }
}

/// Wizard configuration.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    pub limits: OnboardingLimits,
    /// Pause between picking a gender and moving on to the tag step.
    pub gender_advance_delay: Duration,
    /// Pause between the completion signal and entering the result step.
    pub completion_delay: Duration,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            limits: OnboardingLimits::default(),
            gender_advance_delay: Duration::from_millis(300),
            completion_delay: Duration::from_millis(600),
        }
    }
}

impl OnboardingConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            limits: OnboardingLimits {
                min_tags: env_parse("STYLE_ONBOARD_MIN_TAGS", defaults.limits.min_tags),
                max_tags: env_parse("STYLE_ONBOARD_MAX_TAGS", defaults.limits.max_tags),
                required_outfits: env_parse(
                    "STYLE_ONBOARD_REQUIRED_OUTFITS",
                    defaults.limits.required_outfits,
                ),
                outfits_per_page: env_parse(
                    "STYLE_ONBOARD_OUTFITS_PER_PAGE",
                    defaults.limits.outfits_per_page,
                ),
            },
            gender_advance_delay: Duration::from_millis(env_parse(
                "STYLE_ONBOARD_GENDER_DELAY_MS",
                300,
            )),
            completion_delay: Duration::from_millis(env_parse(
                "STYLE_ONBOARD_COMPLETION_DELAY_MS",
                600,
            )),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject limit combinations the wizard cannot satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if limits.min_tags > limits.max_tags {
            return Err(ConfigError::InvalidValue {
                key: "min_tags".to_string(),
                message: format!(
                    "min_tags ({}) exceeds max_tags ({})",
                    limits.min_tags, limits.max_tags
                ),
            });
        }
        if limits.max_tags == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_tags".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if limits.required_outfits == 0 {
            return Err(ConfigError::InvalidValue {
                key: "required_outfits".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if limits.outfits_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                key: "outfits_per_page".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Remote preferences / recommendations API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    pub access_token: Option<SecretString>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("STYLE_ONBOARD_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let access_token = std::env::var("STYLE_ONBOARD_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        let timeout = Duration::from_secs(env_parse("STYLE_ONBOARD_API_TIMEOUT_SECS", 30));

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            timeout,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_match_wizard_copy() {
        let limits = OnboardingLimits::default();
        assert_eq!(limits.min_tags, 3);
        assert_eq!(limits.max_tags, 10);
        assert_eq!(limits.required_outfits, 10);
    }

    #[test]
    fn default_delays() {
        let config = OnboardingConfig::default();
        assert_eq!(config.gender_advance_delay, Duration::from_millis(300));
        assert_eq!(config.completion_delay, Duration::from_millis(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_min_above_max() {
        let config = OnboardingConfig {
            limits: OnboardingLimits {
                min_tags: 5,
                max_tags: 4,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_tags"));
    }

    #[test]
    fn validate_rejects_zero_required_outfits() {
        let config = OnboardingConfig {
            limits: OnboardingLimits {
                required_outfits: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_parse_falls_back_on_garbage() {
        // Key is unlikely to exist; fallback applies.
        assert_eq!(env_parse("STYLE_ONBOARD_TEST_UNSET_KEY", 7usize), 7);
    }
}
