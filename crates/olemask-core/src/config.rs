use serde::{Deserialize, Serialize};

/// Run-wide redaction settings.
///
/// Built once per run and handed by reference to every codec; nothing in the workspace mutates
/// it after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Windows code page for 8-bit text that carries no code page of its own (compressed
    /// XLUnicodeString payloads, EMF `A` records). A workbook `CODEPAGE` record overrides this for
    /// strings inside that workbook.
    pub single_byte_codepage: u16,
    /// Character written over every sensitive character.
    pub mask_char: char,
    /// Maximum number of per-hit log lines emitted while processing one document. Matched values
    /// are never logged, only the rule name, site and length.
    pub max_log_samples: usize,
    /// Fallback for compressed (`fHighByte == 0`) XLUnicodeString text whose odd bytes are all
    /// NUL: decode it as UTF-16LE instead.
    ///
    /// Some producers write UTF-16 text while leaving `fHighByte` clear. Genuine 8-bit text that
    /// alternates with NUL bytes is misread when this is on.
    pub compressed_utf16_fallback: bool,
    /// Re-run the redaction pipeline over the output and report any remaining hits.
    pub verify_after_write: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            single_byte_codepage: 949,
            mask_char: '*',
            max_log_samples: 8,
            compressed_utf16_fallback: true,
            verify_after_write: true,
        }
    }
}

impl RedactionConfig {
    /// The mask character as a single ASCII byte, used to pad byte ranges that cannot hold a whole
    /// encoded mask character.
    pub fn pad_byte(&self) -> u8 {
        crate::text::pad_byte_for(self.mask_char)
    }
}
