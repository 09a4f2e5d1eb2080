//! Scheduler configuration, runtime patches, and per-task options.

use serde::{Deserialize, Serialize};

use crate::core::error::SchedulerError;

fn default_max_workers() -> usize {
    3
}

fn default_backoff_base_ms() -> u64 {
    50
}

/// Construction-time scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum concurrently executing tasks.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Retry budget for tasks that do not override it.
    #[serde(default)]
    pub default_max_retries: u32,
    /// Delay before the first attempt for tasks that do not override it,
    /// in milliseconds.
    #[serde(default)]
    pub default_delay_ms: u64,
    /// Base of the exponential retry backoff: the nth retry waits
    /// `backoff_base_ms * 2^(n-1)` milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Priority for tasks that do not override it (prioritized scheduler
    /// only; higher runs first).
    #[serde(default)]
    pub default_priority: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            default_max_retries: 0,
            default_delay_ms: 0,
            backoff_base_ms: default_backoff_base_ms(),
            default_priority: 0,
        }
    }
}

impl SchedulerConfig {
    /// Configuration with the stock defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker limit.
    #[must_use]
    pub const fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the default retry budget.
    #[must_use]
    pub const fn with_default_max_retries(mut self, retries: u32) -> Self {
        self.default_max_retries = retries;
        self
    }

    /// Set the default first-attempt delay in milliseconds.
    #[must_use]
    pub const fn with_default_delay_ms(mut self, delay_ms: u64) -> Self {
        self.default_delay_ms = delay_ms;
        self
    }

    /// Set the backoff base in milliseconds.
    #[must_use]
    pub const fn with_backoff_base_ms(mut self, base_ms: u64) -> Self {
        self.backoff_base_ms = base_ms;
        self
    }

    /// Set the default priority.
    #[must_use]
    pub const fn with_default_priority(mut self, priority: i64) -> Self {
        self.default_priority = priority;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] when `max_workers` is zero.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.max_workers == 0 {
            return Err(SchedulerError::InvalidConfig(
                "max_workers must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] on parse or validation
    /// failure.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| SchedulerError::InvalidConfig(format!("parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Partial configuration merged into a live scheduler's defaults. Unset
/// fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigPatch {
    /// New worker limit.
    pub max_workers: Option<usize>,
    /// New default retry budget.
    pub default_max_retries: Option<u32>,
    /// New default first-attempt delay in milliseconds.
    pub default_delay_ms: Option<u64>,
    /// New backoff base in milliseconds.
    pub backoff_base_ms: Option<u64>,
    /// New default priority.
    pub default_priority: Option<i64>,
}

impl ConfigPatch {
    /// Empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch the worker limit.
    #[must_use]
    pub const fn max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Patch the default retry budget.
    #[must_use]
    pub const fn default_max_retries(mut self, retries: u32) -> Self {
        self.default_max_retries = Some(retries);
        self
    }

    /// Patch the default first-attempt delay in milliseconds.
    #[must_use]
    pub const fn default_delay_ms(mut self, delay_ms: u64) -> Self {
        self.default_delay_ms = Some(delay_ms);
        self
    }

    /// Patch the backoff base in milliseconds.
    #[must_use]
    pub const fn backoff_base_ms(mut self, base_ms: u64) -> Self {
        self.backoff_base_ms = Some(base_ms);
        self
    }

    /// Patch the default priority.
    #[must_use]
    pub const fn default_priority(mut self, priority: i64) -> Self {
        self.default_priority = Some(priority);
        self
    }

    pub(crate) fn apply(&self, config: &mut SchedulerConfig) {
        if let Some(max_workers) = self.max_workers {
            config.max_workers = max_workers;
        }
        if let Some(retries) = self.default_max_retries {
            config.default_max_retries = retries;
        }
        if let Some(delay_ms) = self.default_delay_ms {
            config.default_delay_ms = delay_ms;
        }
        if let Some(base_ms) = self.backoff_base_ms {
            config.backoff_base_ms = base_ms;
        }
        if let Some(priority) = self.default_priority {
            config.default_priority = priority;
        }
    }
}

/// Per-submission overrides; unset fields fall back to scheduler defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskOptions {
    /// Delay before the first attempt, in milliseconds.
    pub delay_ms: Option<u64>,
    /// Retry budget for this task.
    pub max_retries: Option<u32>,
    /// Priority for this task (prioritized scheduler only).
    pub priority: Option<i64>,
}

impl TaskOptions {
    /// Options that defer everything to the scheduler defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the first-attempt delay in milliseconds.
    #[must_use]
    pub const fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    /// Override the retry budget.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Override the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::new();
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.default_max_retries, 0);
        assert_eq!(config.default_delay_ms, 0);
        assert_eq!(config.backoff_base_ms, 50);
        assert_eq!(config.default_priority, 0);
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = SchedulerConfig::new().with_max_workers(0);
        assert!(config.validate().is_err());
        assert!(SchedulerConfig::new().validate().is_ok());
    }

    #[test]
    fn test_from_json_str() {
        let config =
            SchedulerConfig::from_json_str(r#"{"max_workers": 8, "default_max_retries": 2}"#)
                .unwrap();
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.default_max_retries, 2);
        assert_eq!(config.backoff_base_ms, 50);

        assert!(SchedulerConfig::from_json_str(r#"{"max_workers": 0}"#).is_err());
        assert!(SchedulerConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut config = SchedulerConfig::new();
        ConfigPatch::new()
            .max_workers(5)
            .default_priority(-2)
            .apply(&mut config);
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.default_priority, -2);
        assert_eq!(config.backoff_base_ms, 50);
    }

    #[test]
    fn test_task_options_builders() {
        let opts = TaskOptions::new()
            .with_delay_ms(10)
            .with_max_retries(3)
            .with_priority(7);
        assert_eq!(opts.delay_ms, Some(10));
        assert_eq!(opts.max_retries, Some(3));
        assert_eq!(opts.priority, Some(7));
    }
}
