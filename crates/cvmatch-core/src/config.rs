//! Controller configuration
//!
//! Every value has a default, so an empty TOML document yields the stock
//! controller: `/analyze`, 10 MiB uploads, three attempts with a 1s backoff
//! base, a 1s autosave debounce and 5s error banners.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// URL the multipart form is posted to
    pub endpoint: String,
    pub files: FileRules,
    pub form: FormRules,
    pub retry: RetryConfig,
    pub autosave: AutosaveConfig,
    pub banner: BannerConfig,
    pub results: ResultsConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            endpoint: "/analyze".to_string(),
            files: FileRules::default(),
            form: FormRules::default(),
            retry: RetryConfig::default(),
            autosave: AutosaveConfig::default(),
            banner: BannerConfig::default(),
            results: ResultsConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value fails validation
    ///
    /// # Example
    ///
    /// ```
    /// use cvmatch_core::config::ControllerConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ControllerConfig::from_str(r#"
    ///     endpoint = "/api/analyze"
    ///
    ///     [retry]
    ///     max_attempts = 5
    /// "#)?;
    /// assert_eq!(config.retry.max_attempts, 5);
    /// assert_eq!(config.retry.base_delay_ms, 1000);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse controller configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot operate with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.endpoint.trim().is_empty() {
            bail!("endpoint must not be empty");
        }
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        if self.files.allowed_extensions.is_empty() {
            bail!("files.allowed_extensions must list at least one extension");
        }
        Ok(())
    }
}

/// Rules applied when a CV file is picked or dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRules {
    /// Inclusive upper bound in bytes
    pub max_size_bytes: u64,
    /// Lowercase extensions without the dot
    pub allowed_extensions: Vec<String>,
}

impl Default for FileRules {
    fn default() -> Self {
        Self {
            max_size_bytes: crate::file_check::MAX_FILE_SIZE,
            allowed_extensions: crate::file_check::ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormRules {
    /// Minimum length of the trimmed job description, in characters
    pub min_job_description_chars: usize,
    /// How long an invalid field stays highlighted
    pub highlight_ms: u64,
}

impl Default for FormRules {
    fn default() -> Self {
        Self {
            min_job_description_chars: 50,
            highlight_ms: 2000,
        }
    }
}

impl FormRules {
    pub fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failure; doubles after each further failure
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Local storage key holding the job description draft
    pub storage_key: String,
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            storage_key: crate::draft::DRAFT_STORAGE_KEY.to_string(),
            debounce_ms: 1000,
        }
    }
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Time before an error banner starts fading; 0 keeps it until closed
    pub display_ms: u64,
    /// Length of the fade-out transition
    pub fade_ms: u64,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            display_ms: 5000,
            fade_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Animation delay step between consecutive result sections
    pub stagger_ms: u64,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self { stagger_ms: 100 }
    }
}

impl ResultsConfig {
    /// CSS `animation-delay` for the section at `index`
    pub fn animation_delay(&self, index: usize) -> String {
        let millis = self.stagger_ms.saturating_mul(index as u64);
        format!("{}s", millis as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = ControllerConfig::from_str("").unwrap();
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.endpoint, "/analyze");
        assert_eq!(config.files.max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.autosave.storage_key, "savedJobDescription");
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let config = ControllerConfig::from_str(
            r#"
            [banner]
            display_ms = 0

            [form]
            min_job_description_chars = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.banner.display_ms, 0);
        assert_eq!(config.banner.fade_ms, 300);
        assert_eq!(config.form.min_job_description_chars, 20);
        assert_eq!(config.form.highlight_ms, 2000);
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let err = ControllerConfig::from_str("[retry]\nmax_attempts = 0").unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_rejects_empty_endpoint_and_extensions() {
        assert!(ControllerConfig::from_str("endpoint = \"  \"").is_err());
        assert!(ControllerConfig::from_str("[files]\nallowed_extensions = []").is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = ControllerConfig::from_str("endpoint = ").unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to parse controller configuration"));
    }

    #[test]
    fn test_animation_delay() {
        let results = ResultsConfig::default();
        assert_eq!(results.animation_delay(0), "0s");
        assert_eq!(results.animation_delay(1), "0.1s");
        assert_eq!(results.animation_delay(3), "0.3s");
    }
}
