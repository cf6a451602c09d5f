use bytestream::{ByteError, ByteReader, ByteWriter};

#[test]
fn writer_reader_roundtrip_header_shaped_fields() {
    let mut writer = ByteWriter::new();
    writer.write_u8(7);
    writer.write_u8(0);
    writer.write_u16_le(0x0102);
    writer.write_u32_le(48_000);
    let bytes = writer.finish();
    assert_eq!(bytes.len(), 8);

    let mut reader = ByteReader::new(&bytes);
    assert_eq!(reader.read_u8().unwrap(), 7);
    reader.skip(1).unwrap();
    assert_eq!(reader.read_u16_le().unwrap(), 0x0102);
    assert_eq!(reader.read_u32_le().unwrap(), 48_000);
    assert!(reader.is_empty());
}

#[test]
fn truncated_field_reports_shortfall() {
    let bytes = [0xFFu8; 3];
    let mut reader = ByteReader::new(&bytes);
    reader.skip(2).unwrap();
    let err = reader.read_u16_le().unwrap_err();
    assert_eq!(
        err,
        ByteError::UnexpectedEof {
            requested: 2,
            available: 1
        }
    );
}
