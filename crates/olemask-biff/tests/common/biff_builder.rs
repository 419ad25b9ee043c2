//! Minimal BIFF8 workbook streams for redaction tests.

pub const RECORD_BOF: u16 = 0x0809;
pub const RECORD_EOF: u16 = 0x000A;
pub const RECORD_CONTINUE: u16 = 0x003C;
pub const RECORD_CODEPAGE: u16 = 0x0042;
pub const RECORD_SST: u16 = 0x00FC;
pub const RECORD_EXTSST: u16 = 0x00FF;

pub fn record(opcode: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = opcode.to_le_bytes().to_vec();
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn compressed_string(text: &str) -> Vec<u8> {
    let mut out = (text.len() as u16).to_le_bytes().to_vec();
    out.push(0x00);
    out.extend_from_slice(text.as_bytes());
    out
}

pub fn utf16_string(text: &str) -> Vec<u8> {
    let mut out = (text.encode_utf16().count() as u16).to_le_bytes().to_vec();
    out.push(0x01);
    out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    out
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// A globals substream: `BOF`, optional `CODEPAGE`, the given body records, `EOF`.
pub struct WorkbookStream {
    codepage: Option<u16>,
    body: Vec<u8>,
}

impl WorkbookStream {
    pub fn new() -> Self {
        Self {
            codepage: None,
            body: Vec::new(),
        }
    }

    pub fn codepage(mut self, codepage: u16) -> Self {
        self.codepage = Some(codepage);
        self
    }

    pub fn record(mut self, opcode: u16, payload: &[u8]) -> Self {
        self.body.extend(record(opcode, payload));
        self
    }

    /// An `SST` written as the given physical fragments. Each fragment after the first becomes a
    /// `CONTINUE` record and must already contain any flags byte the split requires.
    pub fn sst(self, fragments: &[Vec<u8>]) -> Self {
        let mut this = self;
        for (i, fragment) in fragments.iter().enumerate() {
            let opcode = if i == 0 { RECORD_SST } else { RECORD_CONTINUE };
            this = this.record(opcode, fragment);
        }
        this
    }

    pub fn build(self) -> Vec<u8> {
        let mut bof = [0u8; 16];
        bof[..4].copy_from_slice(&[0x00, 0x06, 0x05, 0x00]);
        let mut out = record(RECORD_BOF, &bof);
        if let Some(cp) = self.codepage {
            out.extend(record(RECORD_CODEPAGE, &cp.to_le_bytes()));
        }
        out.extend(self.body);
        out.extend(record(RECORD_EOF, &[]));
        out
    }
}

pub fn sst_header(total: u32, unique: u32) -> Vec<u8> {
    let mut out = total.to_le_bytes().to_vec();
    out.extend_from_slice(&unique.to_le_bytes());
    out
}
