//! Table file header (32 bytes).
//!
//! Layout:
//! - 0-15: identity and sizes (magic, version, checksum, payload_size)
//! - 16-23: counts (4 × u16)
//! - 24-31: reserved

use super::{MAGIC, VERSION};

pub const HEADER_SIZE: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Magic bytes: b"SAPT"
    pub magic: [u8; 4],
    pub version: u32,
    /// CRC32 of the payload (everything after the header).
    pub checksum: u32,
    pub payload_size: u32,

    pub symbol_count: u16,
    pub state_count: u16,
    pub production_count: u16,
    pub field_count: u16,

    pub _reserved: [u8; 8],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            checksum: 0,
            payload_size: 0,
            symbol_count: 0,
            state_count: 0,
            production_count: 0,
            field_count: 0,
            _reserved: [0; 8],
        }
    }
}

impl Header {
    /// Decode a header from the first 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);

        let mut reserved = [0u8; 8];
        reserved.copy_from_slice(&bytes[24..32]);

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32_at(4),
            checksum: u32_at(8),
            payload_size: u32_at(12),
            symbol_count: u16_at(16),
            state_count: u16_at(18),
            production_count: u16_at(20),
            field_count: u16_at(22),
            _reserved: reserved,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.payload_size.to_le_bytes());
        bytes[16..18].copy_from_slice(&self.symbol_count.to_le_bytes());
        bytes[18..20].copy_from_slice(&self.state_count.to_le_bytes());
        bytes[20..22].copy_from_slice(&self.production_count.to_le_bytes());
        bytes[22..24].copy_from_slice(&self.field_count.to_le_bytes());
        bytes[24..32].copy_from_slice(&self._reserved);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }
}
