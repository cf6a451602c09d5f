//! Configurable limits for bounded decoding.

/// Wire-level limits for PDU body decoding.
///
/// The 16-bit size field already bounds every body; these limits bound the
/// work done inside one body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Maximum number of entries accepted in one SNDC_FORMATS table.
    pub max_formats: usize,

    /// Maximum codec-specific tail length of a single format entry.
    pub max_codec_data_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Servers typically advertise a few dozen formats
            max_formats: 128,
            max_codec_data_len: 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_formats: 8,
            max_codec_data_len: 64,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_formats: usize::MAX,
            max_codec_data_len: usize::MAX,
        }
    }
}
