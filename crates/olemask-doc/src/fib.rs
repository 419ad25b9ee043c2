//! The parts of the File Information Block needed to find the piece table.

use crate::error::DocError;

pub const WORD_IDENT: u16 = 0xA5EC;

const OFFSET_FLAGS: usize = 0x000A;
const OFFSET_FC_CLX: usize = 0x01A2;
const OFFSET_LCB_CLX: usize = 0x01A6;

const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE: u16 = 0x0200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fib {
    pub ident: u16,
    pub flags: u16,
    pub fc_clx: u32,
    pub lcb_clx: u32,
}

impl Fib {
    pub fn parse(word_doc: &[u8]) -> Result<Self, DocError> {
        let too_short = || DocError::FibTooShort { len: word_doc.len() };
        let ident = read_u16(word_doc, 0).ok_or_else(too_short)?;
        if ident != WORD_IDENT {
            return Err(DocError::BadIdent { ident });
        }
        Ok(Self {
            ident,
            flags: read_u16(word_doc, OFFSET_FLAGS).ok_or_else(too_short)?,
            fc_clx: read_u32(word_doc, OFFSET_FC_CLX).ok_or_else(too_short)?,
            lcb_clx: read_u32(word_doc, OFFSET_LCB_CLX).ok_or_else(too_short)?,
        })
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// `1Table` when `fWhichTblStm` is set, `0Table` otherwise.
    pub fn table_stream_name(&self) -> &'static str {
        if self.flags & FLAG_WHICH_TABLE != 0 {
            "1Table"
        } else {
            "0Table"
        }
    }
}

pub(crate) fn read_u16(buf: &[u8], offset: usize) -> Option<u16> {
    let b = buf.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let b = buf.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
