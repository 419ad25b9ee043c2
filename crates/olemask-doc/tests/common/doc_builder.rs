//! `WordDocument` and table streams with a hand-built piece table.

pub const TEXT_START: usize = 0x800;

pub struct WordStreams {
    pub word_doc: Vec<u8>,
    pub table: Vec<u8>,
}

/// Lay the pieces out back to back from [`TEXT_START`]; compressed pieces are cp1252 (ASCII
/// here), the rest UTF-16LE. The piece table goes into `1Table` (`fWhichTblStm` set).
pub fn word_streams(pieces: &[(&str, bool)], flags: u16) -> WordStreams {
    let mut word_doc = vec![0u8; TEXT_START];
    word_doc[..2].copy_from_slice(&0xA5ECu16.to_le_bytes());
    word_doc[0x0A..0x0C].copy_from_slice(&(flags | 0x0200).to_le_bytes());

    let mut cps = vec![0u32];
    let mut fcs = Vec::new();
    for (text, compressed) in pieces {
        let offset = word_doc.len() as u32;
        if *compressed {
            fcs.push((offset * 2) | 0x4000_0000);
            word_doc.extend_from_slice(text.as_bytes());
        } else {
            fcs.push(offset);
            word_doc.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        }
        let last = *cps.last().unwrap_or(&0);
        cps.push(last + text.encode_utf16().count() as u32);
    }
    word_doc.extend_from_slice(&[0u8; 64]);

    let mut plc = Vec::new();
    for cp in &cps {
        plc.extend_from_slice(&cp.to_le_bytes());
    }
    for fc in &fcs {
        plc.extend_from_slice(&[0, 0]);
        plc.extend_from_slice(&fc.to_le_bytes());
        plc.extend_from_slice(&[0, 0]);
    }
    let mut table = vec![0u8; 32];
    let fc_clx = table.len() as u32;
    table.push(0x02);
    table.extend_from_slice(&(plc.len() as u32).to_le_bytes());
    table.extend(plc);
    let lcb_clx = table.len() as u32 - fc_clx;
    table.extend_from_slice(&[0u8; 16]);

    word_doc[0x1A2..0x1A6].copy_from_slice(&fc_clx.to_le_bytes());
    word_doc[0x1A6..0x1AA].copy_from_slice(&lcb_clx.to_le_bytes());
    WordStreams { word_doc, table }
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}
