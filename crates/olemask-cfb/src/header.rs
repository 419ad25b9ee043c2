use crate::error::CfbError;

/// `D0 CF 11 E0 A1 B1 1A E1`
pub const MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

pub(crate) const HEADER_LEN: usize = 512;
const HEADER_DIFAT_OFFSET: usize = 0x4C;
const HEADER_DIFAT_ENTRIES: usize = 109;

/// The fixed 512-byte compound file header [MS-CFB 2.2].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub major_version: u16,
    pub sector_shift: u16,
    pub mini_sector_shift: u16,
    pub num_fat_sectors: u32,
    pub first_dir_sector: u32,
    pub mini_stream_cutoff: u32,
    pub first_mini_fat_sector: u32,
    pub num_mini_fat_sectors: u32,
    pub first_difat_sector: u32,
    pub num_difat_sectors: u32,
    /// The first 109 FAT sector locations.
    pub difat: Vec<u32>,
}

impl Header {
    pub fn parse(bytes: &[u8]) -> Result<Self, CfbError> {
        if bytes.len() < HEADER_LEN {
            return Err(CfbError::TooShort { len: bytes.len() });
        }
        if bytes[..8] != MAGIC {
            return Err(CfbError::BadSignature);
        }

        let sector_shift = read_u16(bytes, 0x1E);
        if sector_shift != 0x09 && sector_shift != 0x0C {
            return Err(CfbError::UnsupportedSectorShift(sector_shift));
        }
        let mini_sector_shift = read_u16(bytes, 0x20);
        if mini_sector_shift != 0x06 {
            return Err(CfbError::UnsupportedMiniSectorShift(mini_sector_shift));
        }

        let difat = (0..HEADER_DIFAT_ENTRIES)
            .map(|i| read_u32(bytes, HEADER_DIFAT_OFFSET + i * 4))
            .collect();

        Ok(Self {
            major_version: read_u16(bytes, 0x1A),
            sector_shift,
            mini_sector_shift,
            num_fat_sectors: read_u32(bytes, 0x2C),
            first_dir_sector: read_u32(bytes, 0x30),
            mini_stream_cutoff: read_u32(bytes, 0x38),
            first_mini_fat_sector: read_u32(bytes, 0x3C),
            num_mini_fat_sectors: read_u32(bytes, 0x40),
            first_difat_sector: read_u32(bytes, 0x44),
            num_difat_sectors: read_u32(bytes, 0x48),
            difat,
        })
    }

    pub fn sector_size(&self) -> usize {
        1usize << self.sector_shift
    }

    pub fn mini_sector_size(&self) -> usize {
        1usize << self.mini_sector_shift
    }
}

// Callers guarantee `offset + 2`/`offset + 4`/`offset + 8` is in bounds.
pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

pub(crate) fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}
