//! CLX and PlcPcd: the piece table mapping character positions to WordDocument bytes.

use crate::fib::{read_u16, read_u32, Fib};

const CLX_PRC: u8 = 0x01;
const CLX_PCDT: u8 = 0x02;
const PCD_LEN: usize = 8;
const FC_MASK: u32 = 0x3FFF_FFFF;
const FC_COMPRESSED: u32 = 0x4000_0000;

/// One piece descriptor with its character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlcPiece {
    pub index: usize,
    /// `fc` with the flag bits cleared.
    pub fc: u32,
    pub compressed: bool,
    pub cp_start: u32,
    pub cp_end: u32,
}

impl PlcPiece {
    /// Byte offset of the piece text in the WordDocument stream. Compressed pieces store
    /// `fc * 2`.
    pub fn byte_offset(&self) -> usize {
        if self.compressed {
            (self.fc / 2) as usize
        } else {
            self.fc as usize
        }
    }

    pub fn bytes_per_char(&self) -> usize {
        if self.compressed {
            1
        } else {
            2
        }
    }

    pub fn char_len(&self) -> usize {
        (self.cp_end - self.cp_start) as usize
    }

    pub fn byte_len(&self) -> usize {
        self.char_len() * self.bytes_per_char()
    }
}

/// A byte range in the WordDocument stream covering part of one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
    pub bytes_per_char: usize,
}

/// Read the piece table. Any structural problem (missing or out-of-range CLX, malformed
/// PlcPcd, decreasing character positions) yields an empty list.
pub fn locate_pieces(word_doc: &[u8], table: &[u8]) -> Vec<PlcPiece> {
    let Ok(fib) = Fib::parse(word_doc) else {
        return Vec::new();
    };
    let start = fib.fc_clx as usize;
    let Some(clx) = start
        .checked_add(fib.lcb_clx as usize)
        .and_then(|end| table.get(start..end))
    else {
        log::debug!(
            "CLX at {}+{} lies outside the {}-byte table stream",
            fib.fc_clx,
            fib.lcb_clx,
            table.len()
        );
        return Vec::new();
    };
    parse_plcpcd(find_plcpcd(clx))
}

/// Skip `Prc` blocks and return the `PlcPcd` of the first `Pcdt`.
fn find_plcpcd(clx: &[u8]) -> &[u8] {
    let mut pos = 0usize;
    while let Some(&tag) = clx.get(pos) {
        pos += 1;
        match tag {
            CLX_PRC => {
                let Some(cb) = read_u16(clx, pos) else {
                    break;
                };
                pos += 2 + cb as usize;
            }
            CLX_PCDT => {
                let Some(lcb) = read_u32(clx, pos) else {
                    break;
                };
                pos += 4;
                let end = pos.saturating_add(lcb as usize).min(clx.len());
                return &clx[pos..end];
            }
            other => {
                log::debug!("unexpected CLX block type {other:#04x}");
                break;
            }
        }
    }
    &[]
}

fn parse_plcpcd(plcpcd: &[u8]) -> Vec<PlcPiece> {
    if plcpcd.len() < 4 || (plcpcd.len() - 4) % 12 != 0 {
        return Vec::new();
    }
    let n = (plcpcd.len() - 4) / 12;
    let cps: Vec<u32> = (0..=n)
        .filter_map(|i| read_u32(plcpcd, i * 4))
        .collect();
    let pcd_base = (n + 1) * 4;

    let mut pieces = Vec::with_capacity(n);
    for index in 0..n {
        let (cp_start, cp_end) = (cps[index], cps[index + 1]);
        if cp_end < cp_start {
            log::debug!("piece {index} has decreasing character positions");
            return Vec::new();
        }
        let Some(fc_raw) = read_u32(plcpcd, pcd_base + index * PCD_LEN + 2) else {
            return Vec::new();
        };
        pieces.push(PlcPiece {
            index,
            fc: fc_raw & FC_MASK,
            compressed: fc_raw & FC_COMPRESSED != 0,
            cp_start,
            cp_end,
        });
    }
    pieces
}

/// Byte ranges covering the text positions `char_start..char_end`, split at piece boundaries.
///
/// Text positions count characters of the pieces concatenated in order, which is how
/// [`crate::document_text`] builds the document text.
pub fn map_char_range_to_bytes(
    pieces: &[PlcPiece],
    char_start: usize,
    char_end: usize,
) -> Vec<ByteRange> {
    let mut out = Vec::new();
    let mut text_pos = 0usize;
    for piece in pieces {
        let piece_start = text_pos;
        let piece_end = text_pos + piece.char_len();
        text_pos = piece_end;
        if char_end <= piece_start || char_start >= piece_end {
            continue;
        }
        let local_start = char_start.max(piece_start) - piece_start;
        let local_end = char_end.min(piece_end) - piece_start;
        let bpc = piece.bytes_per_char();
        out.push(ByteRange {
            start: piece.byte_offset() + local_start * bpc,
            end: piece.byte_offset() + local_end * bpc,
            bytes_per_char: bpc,
        });
    }
    out
}
