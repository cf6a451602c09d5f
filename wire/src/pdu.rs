//! Whole-PDU decoding and outbound PDU framing.

use bytestream::ByteWriter;

use crate::error::{EncodeError, FrameError, FrameResult};
use crate::header::{decode_header, MessageType, PduHeader, HEADER_SIZE};

/// A single framed PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pdu<'a> {
    pub header: PduHeader,
    pub body: &'a [u8],
}

/// Decodes a buffer holding exactly one tagged PDU.
///
/// Fails with [`FrameError::SizeMismatch`] if the bytes after the header do
/// not match the header's wire length.
pub fn decode_pdu(buf: &[u8]) -> FrameResult<Pdu<'_>> {
    let header = decode_header(buf)?;
    let declared = header.wire_body_len();
    let actual = buf.len() - HEADER_SIZE;
    if declared != actual {
        return Err(FrameError::SizeMismatch { declared, actual });
    }
    Ok(Pdu {
        header,
        body: &buf[HEADER_SIZE..],
    })
}

/// Writes a header into the provided writer.
pub fn encode_header(header: PduHeader, out: &mut ByteWriter) {
    out.write_bytes(&header.to_bytes());
}

/// Frames `body` as a PDU of the given type.
///
/// SNDC_WAVE is rejected because its declared size is not its body length;
/// use [`encode_wave`](crate::encode_wave) instead.
pub fn encode_pdu(message_type: MessageType, body: &[u8]) -> Result<Vec<u8>, EncodeError> {
    if message_type == MessageType::Wave {
        return Err(EncodeError::UnexpectedType { message_type });
    }
    let body_size = u16::try_from(body.len())
        .map_err(|_| EncodeError::BodyTooLarge { length: body.len() })?;

    let mut out = ByteWriter::with_capacity(HEADER_SIZE + body.len());
    encode_header(PduHeader::new(message_type, body_size), &mut out);
    out.write_bytes(body);
    Ok(out.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let bytes = encode_pdu(MessageType::Training, &[1, 2, 3, 4]).unwrap();
        assert_eq!(bytes, vec![6, 0, 4, 0, 1, 2, 3, 4]);

        let pdu = decode_pdu(&bytes).unwrap();
        assert_eq!(pdu.header, PduHeader::new(MessageType::Training, 4));
        assert_eq!(pdu.body, &[1, 2, 3, 4]);
    }

    #[test]
    fn decode_empty_body() {
        let pdu = decode_pdu(&[1, 0, 0, 0]).unwrap();
        assert_eq!(pdu.header.message_type, MessageType::Close);
        assert!(pdu.body.is_empty());
    }

    #[test]
    fn decode_size_mismatch_short() {
        let err = decode_pdu(&[6, 0, 4, 0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            FrameError::SizeMismatch {
                declared: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn decode_size_mismatch_extra_bytes() {
        let err = decode_pdu(&[1, 0, 0, 0, 9]).unwrap_err();
        assert!(matches!(err, FrameError::SizeMismatch { .. }));
    }

    #[test]
    fn decode_wave_info_uses_fixed_body() {
        let mut buf = vec![2, 0];
        buf.extend_from_slice(&512u16.to_le_bytes());
        buf.extend_from_slice(&[0u8; 12]);
        let pdu = decode_pdu(&buf).unwrap();
        assert_eq!(pdu.header.body_size, 512);
        assert_eq!(pdu.body.len(), 12);
    }

    #[test]
    fn decode_truncated_header() {
        let err = decode_pdu(&[6]).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { .. }));
    }

    #[test]
    fn encode_rejects_wave() {
        let err = encode_pdu(MessageType::Wave, &[0; 12]).unwrap_err();
        assert_eq!(
            err,
            EncodeError::UnexpectedType {
                message_type: MessageType::Wave
            }
        );
    }

    #[test]
    fn encode_rejects_oversized_body() {
        let body = vec![0u8; usize::from(u16::MAX) + 1];
        let err = encode_pdu(MessageType::Training, &body).unwrap_err();
        assert!(matches!(err, EncodeError::BodyTooLarge { .. }));
    }
}
