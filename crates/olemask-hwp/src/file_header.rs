use crate::error::HwpError;
use crate::records::read_u32;

pub const SIGNATURE: &[u8] = b"HWP Document File";

const FLAG_COMPRESSED: u32 = 0x01;
const FLAG_ENCRYPTED: u32 = 0x02;
const FLAG_DISTRIBUTION: u32 = 0x04;

/// The fixed 256-byte `FileHeader` stream: a 32-byte signature, the version, then property flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u32,
    pub flags: u32,
}

impl FileHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, HwpError> {
        let (Some(version), Some(flags)) = (read_u32(bytes, 32), read_u32(bytes, 36)) else {
            return Err(HwpError::FileHeaderTooShort { len: bytes.len() });
        };
        if !bytes.starts_with(SIGNATURE) {
            return Err(HwpError::BadSignature);
        }
        Ok(Self { version, flags })
    }

    /// Body sections and `BinData` streams are raw deflate.
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Distribution documents keep their sections in `ViewText`, encrypted.
    pub fn is_distribution(&self) -> bool {
        self.flags & FLAG_DISTRIBUTION != 0
    }

    /// `major.minor.build.revision`, most significant byte first.
    pub fn version_string(&self) -> String {
        let [revision, build, minor, major] = self.version.to_le_bytes();
        format!("{major}.{minor}.{build}.{revision}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(flags: u32) -> Vec<u8> {
        let mut out = vec![0u8; 256];
        out[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
        out[32..36].copy_from_slice(&0x0501_0000u32.to_le_bytes());
        out[36..40].copy_from_slice(&flags.to_le_bytes());
        out
    }

    #[test]
    fn reads_flags_and_version() {
        let parsed = FileHeader::parse(&header(0x03)).expect("header");
        assert!(parsed.is_compressed());
        assert!(parsed.is_encrypted());
        assert!(!parsed.is_distribution());
        assert_eq!(parsed.version_string(), "5.1.0.0");
    }

    #[test]
    fn rejects_foreign_streams() {
        assert!(matches!(
            FileHeader::parse(&[0u8; 12]),
            Err(HwpError::FileHeaderTooShort { len: 12 })
        ));
        let mut bad = header(0);
        bad[0] = b'X';
        assert!(matches!(FileHeader::parse(&bad), Err(HwpError::BadSignature)));
    }
}
