//! Session configuration.

use wire::{Limits, QualityMode};

/// Which server formats the client accepts and echoes back.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormatPolicy {
    /// Accept only PCM entries.
    pub pcm_only: bool,
    /// Maximum number of formats in the client's formats response.
    pub max_response_formats: usize,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self {
            pcm_only: false,
            max_response_formats: 32,
        }
    }
}

impl FormatPolicy {
    /// Policy that accepts every advertised format.
    #[must_use]
    pub const fn accept_all() -> Self {
        Self {
            pcm_only: false,
            max_response_formats: usize::MAX,
        }
    }
}

/// Per-session behavior of the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Mode announced to servers of version 6 or later.
    pub quality_mode: QualityMode,
    pub formats: FormatPolicy,
    /// Send SNDC_WAVECONFIRM after every completed wave.
    pub confirm_waves: bool,
    pub limits: Limits,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quality_mode: QualityMode::Dynamic,
            formats: FormatPolicy::default(),
            confirm_waves: true,
            limits: Limits::default(),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration suitable for testing with smaller limits.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            formats: FormatPolicy {
                pcm_only: false,
                max_response_formats: 4,
            },
            limits: Limits::for_testing(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.quality_mode, QualityMode::Dynamic);
        assert!(config.confirm_waves);
        assert!(!config.formats.pcm_only);
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn testing_config_smaller() {
        let test_config = SessionConfig::for_testing();
        let default_config = SessionConfig::default();
        assert!(test_config.limits.max_formats < default_config.limits.max_formats);
        assert!(
            test_config.formats.max_response_formats < default_config.formats.max_response_formats
        );
    }

    #[test]
    fn accept_all_is_uncapped() {
        let policy = FormatPolicy::accept_all();
        assert!(!policy.pcm_only);
        assert_eq!(policy.max_response_formats, usize::MAX);
    }
}
