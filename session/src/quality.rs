//! Quality mode negotiation.

use wire::QualityMode;

/// Quality mode in effect for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionQuality {
    pub mode: QualityMode,
}

/// Decides when to announce the client's quality mode.
///
/// The mode is sent at most once per session, on the first format table from
/// a server of version 6 or later. Later tables never trigger it again.
#[derive(Debug, Clone)]
pub struct QualityNegotiator {
    mode: QualityMode,
    selected: Option<SessionQuality>,
}

impl QualityNegotiator {
    #[must_use]
    pub const fn new(mode: QualityMode) -> Self {
        Self {
            mode,
            selected: None,
        }
    }

    /// Returns the SNDC_QUALITYMODE PDU to send, if one is due.
    pub fn on_formats_received(&mut self, version: u16) -> Option<Vec<u8>> {
        if self.selected.is_some() || !QualityMode::supported_by(version) {
            return None;
        }
        self.selected = Some(SessionQuality { mode: self.mode });
        Some(self.mode.to_pdu())
    }

    /// The announced quality, absent until a capable server is seen.
    #[must_use]
    pub const fn quality(&self) -> Option<SessionQuality> {
        self.selected
    }
}

impl Default for QualityNegotiator {
    fn default() -> Self {
        Self::new(QualityMode::default())
    }
}
