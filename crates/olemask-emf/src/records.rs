pub const EMR_HEADER: u32 = 0x01;
pub const EMR_EOF: u32 = 0x0E;
pub const EMR_EXTTEXTOUTA: u32 = 0x53;
pub const EMR_EXTTEXTOUTW: u32 = 0x54;
pub const EMR_POLYTEXTOUTA: u32 = 0x60;
pub const EMR_POLYTEXTOUTW: u32 = 0x61;
pub const EMR_SMALLTEXTOUT: u32 = 0x6C;

/// `" EMF"` at offset 40 of `EMR_HEADER`.
pub const EMF_SIGNATURE: [u8; 4] = *b" EMF";
const SIGNATURE_OFFSET: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmfRecordKind {
    Header,
    Eof,
    ExtTextOutA,
    ExtTextOutW,
    PolyTextOutA,
    PolyTextOutW,
    SmallTextOut,
    Other(u32),
}

impl EmfRecordKind {
    pub fn from_type(record_type: u32) -> Self {
        match record_type {
            EMR_HEADER => EmfRecordKind::Header,
            EMR_EOF => EmfRecordKind::Eof,
            EMR_EXTTEXTOUTA => EmfRecordKind::ExtTextOutA,
            EMR_EXTTEXTOUTW => EmfRecordKind::ExtTextOutW,
            EMR_POLYTEXTOUTA => EmfRecordKind::PolyTextOutA,
            EMR_POLYTEXTOUTW => EmfRecordKind::PolyTextOutW,
            EMR_SMALLTEXTOUT => EmfRecordKind::SmallTextOut,
            other => EmfRecordKind::Other(other),
        }
    }

    pub fn carries_text(self) -> bool {
        matches!(
            self,
            EmfRecordKind::ExtTextOutA
                | EmfRecordKind::ExtTextOutW
                | EmfRecordKind::PolyTextOutA
                | EmfRecordKind::PolyTextOutW
                | EmfRecordKind::SmallTextOut
        )
    }
}

/// One EMR record; `offset` and `size` cover the 8-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmfRecord {
    pub offset: usize,
    pub record_type: u32,
    pub size: usize,
}

impl EmfRecord {
    pub fn kind(&self) -> EmfRecordKind {
        EmfRecordKind::from_type(self.record_type)
    }

    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn payload<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        buf.get(self.offset + 8..self.end()).unwrap_or_default()
    }
}

/// Iterator over EMR records.
///
/// Stops at a size below 8, a size that overruns the buffer, or after yielding `EMR_EOF`.
#[derive(Debug, Clone)]
pub struct EmfRecordIter<'a> {
    buf: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> EmfRecordIter<'a> {
    pub fn from_offset(buf: &'a [u8], offset: usize) -> Self {
        Self {
            buf,
            offset,
            done: false,
        }
    }
}

impl Iterator for EmfRecordIter<'_> {
    type Item = EmfRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let offset = self.offset;
        let (Some(record_type), Some(size)) =
            (read_u32(self.buf, offset), read_u32(self.buf, offset + 4))
        else {
            self.done = true;
            return None;
        };
        let size = size as usize;
        if size < 8 || offset.checked_add(size).map_or(true, |end| end > self.buf.len()) {
            log::debug!("EMF record at offset {offset} declares size {size}; stopping");
            self.done = true;
            return None;
        }
        self.offset = offset + size;
        if record_type == EMR_EOF {
            self.done = true;
        }
        Some(EmfRecord {
            offset,
            record_type,
            size,
        })
    }
}

pub fn iterate_records(buf: &[u8]) -> EmfRecordIter<'_> {
    EmfRecordIter::from_offset(buf, 0)
}

/// Offset of the first `EMR_HEADER` carrying the `" EMF"` signature, for metafiles embedded
/// behind a presentation-stream header.
pub fn find_emf_start(buf: &[u8]) -> Option<usize> {
    let last = buf.len().checked_sub(SIGNATURE_OFFSET + EMF_SIGNATURE.len())?;
    (0..=last).find(|&pos| {
        read_u32(buf, pos) == Some(EMR_HEADER)
            && buf[pos + SIGNATURE_OFFSET..pos + SIGNATURE_OFFSET + 4] == EMF_SIGNATURE
    })
}

pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let b = buf.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
