//! Format negotiation policy.

use wire::{
    encode_formats, select_format, AudioFormat, EncodeError, FormatTable, UnsupportedFormat,
    TSSNDCAPS_ALIVE,
};

use crate::config::FormatPolicy;

/// Outcome of negotiating one server format table.
///
/// Wave PDUs refer to formats by their position in the client list, not in
/// the server table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedFormats {
    server: FormatTable,
    selected: Option<usize>,
    client: Vec<AudioFormat>,
}

/// Negotiates a server format table under `policy`.
///
/// The selected format leads the client list, followed by the other accepted
/// formats in the order the server advertised them.
#[must_use]
pub fn negotiate(table: FormatTable, policy: &FormatPolicy) -> NegotiatedFormats {
    let accepts = |format: &AudioFormat| !policy.pcm_only || format.is_pcm();
    let selected = if policy.pcm_only {
        table.formats.iter().position(AudioFormat::is_pcm)
    } else {
        select_format(&table)
    };

    let client = match selected {
        Some(selected) => {
            let cap = policy.max_response_formats.max(1);
            let rest = table
                .formats
                .iter()
                .enumerate()
                .filter(|&(index, format)| index != selected && accepts(format))
                .map(|(_, format)| format);
            std::iter::once(&table.formats[selected])
                .chain(rest)
                .take(cap)
                .cloned()
                .collect()
        }
        None => Vec::new(),
    };

    NegotiatedFormats {
        server: table,
        selected,
        client,
    }
}

impl NegotiatedFormats {
    /// The table exactly as the server advertised it.
    #[must_use]
    pub const fn server_table(&self) -> &FormatTable {
        &self.server
    }

    #[must_use]
    pub const fn version(&self) -> u16 {
        self.server.version
    }

    /// Index of the selected format in the server table.
    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn selected_format(&self) -> Option<&AudioFormat> {
        self.client.first()
    }

    /// Formats echoed to the server, selected format first.
    #[must_use]
    pub fn client_formats(&self) -> &[AudioFormat] {
        &self.client
    }

    /// Returns `true` if audio can be played under this negotiation.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.client.is_empty()
    }

    /// Why no format could be selected, if none was.
    #[must_use]
    pub fn unsupported(&self) -> Option<UnsupportedFormat> {
        if self.selected.is_some() {
            None
        } else if self.server.is_empty() {
            Some(UnsupportedFormat::EmptyTable)
        } else {
            Some(UnsupportedFormat::NoAcceptableFormat)
        }
    }

    /// Resolves a wave `format_index` against the client list.
    pub fn format(&self, index: u16) -> Result<&AudioFormat, UnsupportedFormat> {
        if self.client.is_empty() {
            return Err(UnsupportedFormat::NotNegotiated);
        }
        self.client
            .get(usize::from(index))
            .ok_or(UnsupportedFormat::IndexOutOfRange {
                index,
                available: self.client.len(),
            })
    }

    /// Encodes the client SNDC_FORMATS response.
    pub fn encode_response(&self) -> Result<Vec<u8>, EncodeError> {
        encode_formats(self.server.version, TSSNDCAPS_ALIVE, &self.client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::{decode_pdu, parse_formats, FormatTag, Limits, MessageType};

    fn adpcm() -> AudioFormat {
        AudioFormat {
            tag: FormatTag::Adpcm,
            channels: 2,
            samples_per_second: 22_050,
            bytes_per_second: 22_311,
            block_align: 1024,
            bits_per_sample: 4,
            codec_data: vec![0xF4, 0x07],
        }
    }

    fn table(formats: Vec<AudioFormat>) -> FormatTable {
        FormatTable {
            version: 8,
            flags: 0,
            formats,
        }
    }

    #[test]
    fn selected_pcm_leads_client_list() {
        let pcm = AudioFormat::pcm(2, 44_100, 16);
        let negotiated = negotiate(
            table(vec![adpcm(), pcm.clone(), adpcm()]),
            &FormatPolicy::default(),
        );
        assert_eq!(negotiated.selected(), Some(1));
        assert_eq!(negotiated.selected_format(), Some(&pcm));
        assert_eq!(negotiated.client_formats(), &[pcm, adpcm(), adpcm()]);
        assert!(negotiated.unsupported().is_none());
    }

    #[test]
    fn falls_back_to_first_without_pcm() {
        let negotiated = negotiate(table(vec![adpcm()]), &FormatPolicy::default());
        assert_eq!(negotiated.selected(), Some(0));
        assert_eq!(negotiated.client_formats().len(), 1);
    }

    #[test]
    fn empty_table_disables_audio() {
        let negotiated = negotiate(table(Vec::new()), &FormatPolicy::default());
        assert_eq!(negotiated.selected(), None);
        assert!(!negotiated.is_usable());
        assert_eq!(negotiated.unsupported(), Some(UnsupportedFormat::EmptyTable));
        assert_eq!(negotiated.format(0), Err(UnsupportedFormat::NotNegotiated));
    }

    #[test]
    fn pcm_only_filters_other_tags() {
        let policy = FormatPolicy {
            pcm_only: true,
            ..FormatPolicy::default()
        };
        let pcm = AudioFormat::pcm(1, 8_000, 8);
        let negotiated = negotiate(table(vec![adpcm(), pcm.clone()]), &policy);
        assert_eq!(negotiated.client_formats(), &[pcm]);

        let negotiated = negotiate(table(vec![adpcm()]), &policy);
        assert_eq!(
            negotiated.unsupported(),
            Some(UnsupportedFormat::NoAcceptableFormat)
        );
        assert!(negotiated.client_formats().is_empty());
    }

    #[test]
    fn response_cap_keeps_selected() {
        let policy = FormatPolicy {
            pcm_only: false,
            max_response_formats: 2,
        };
        let pcm = AudioFormat::pcm(2, 48_000, 16);
        let negotiated = negotiate(
            table(vec![adpcm(), adpcm(), adpcm(), pcm.clone()]),
            &policy,
        );
        assert_eq!(negotiated.client_formats(), &[pcm, adpcm()]);
    }

    #[test]
    fn format_index_resolves_client_list() {
        let pcm = AudioFormat::pcm(2, 44_100, 16);
        let negotiated = negotiate(table(vec![adpcm(), pcm.clone()]), &FormatPolicy::default());
        assert_eq!(negotiated.format(0), Ok(&pcm));
        assert_eq!(negotiated.format(1), Ok(&adpcm()));
        assert_eq!(
            negotiated.format(2),
            Err(UnsupportedFormat::IndexOutOfRange {
                index: 2,
                available: 2
            })
        );
    }

    #[test]
    fn response_echoes_version_and_sets_alive() {
        let pcm = AudioFormat::pcm(2, 44_100, 16);
        let negotiated = negotiate(table(vec![adpcm(), pcm.clone()]), &FormatPolicy::default());
        let bytes = negotiated.encode_response().unwrap();
        let pdu = decode_pdu(&bytes).unwrap();
        assert_eq!(pdu.header.message_type, MessageType::Formats);

        let echoed = parse_formats(pdu.body, &Limits::default()).unwrap();
        assert_eq!(echoed.version, 8);
        assert_eq!(echoed.flags, TSSNDCAPS_ALIVE);
        assert_eq!(echoed.formats, vec![pcm, adpcm()]);
    }
}
