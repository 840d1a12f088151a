use super::header::{HEADER_SIZE, Header};
use super::{MAGIC, VERSION};

#[test]
fn default_header_identity() {
    let header = Header::default();
    assert_eq!(header.magic, MAGIC);
    assert_eq!(header.version, VERSION);
    assert!(header.validate_magic());
    assert!(header.validate_version());
}

#[test]
fn header_layout() {
    let header = Header {
        checksum: 0xDEAD_BEEF,
        payload_size: 300,
        symbol_count: 12,
        state_count: 40,
        production_count: 9,
        field_count: 2,
        ..Header::default()
    };
    let bytes = header.to_bytes();

    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(&bytes[0..4], b"SAPT");
    assert_eq!(&bytes[8..12], &0xDEAD_BEEFu32.to_le_bytes());
    assert_eq!(&bytes[16..18], &12u16.to_le_bytes());
    assert_eq!(Header::from_bytes(&bytes), header);
}

#[test]
#[should_panic(expected = "header too short")]
fn header_too_short() {
    Header::from_bytes(&[0u8; 8]);
}
