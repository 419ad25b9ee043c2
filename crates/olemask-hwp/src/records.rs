//! HWP 5.0 record stream.
//!
//! Each record starts with a packed little-endian `u32`: tag id in bits 0..10, nesting level in
//! bits 10..20, payload size in bits 20..32. A size of `0xFFF` means the real size follows as a
//! `u32`.

pub const HWPTAG_BEGIN: u16 = 0x010;
pub const HWPTAG_PARA_HEADER: u16 = HWPTAG_BEGIN + 50;
pub const HWPTAG_PARA_TEXT: u16 = HWPTAG_BEGIN + 51;
pub const HWPTAG_PARA_CHAR_SHAPE: u16 = HWPTAG_BEGIN + 52;
pub const HWPTAG_PARA_LINE_SEG: u16 = HWPTAG_BEGIN + 53;
pub const HWPTAG_PARA_RANGE_TAG: u16 = HWPTAG_BEGIN + 54;
pub const HWPTAG_CTRL_HEADER: u16 = HWPTAG_BEGIN + 55;
pub const HWPTAG_LIST_HEADER: u16 = HWPTAG_BEGIN + 56;

const SIZE_ESCAPE: u32 = 0xFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwpTag {
    ParaHeader,
    ParaText,
    ParaCharShape,
    ParaLineSeg,
    ParaRangeTag,
    CtrlHeader,
    ListHeader,
    Other(u16),
}

impl HwpTag {
    pub fn from_id(id: u16) -> Self {
        match id {
            HWPTAG_PARA_HEADER => HwpTag::ParaHeader,
            HWPTAG_PARA_TEXT => HwpTag::ParaText,
            HWPTAG_PARA_CHAR_SHAPE => HwpTag::ParaCharShape,
            HWPTAG_PARA_LINE_SEG => HwpTag::ParaLineSeg,
            HWPTAG_PARA_RANGE_TAG => HwpTag::ParaRangeTag,
            HWPTAG_CTRL_HEADER => HwpTag::CtrlHeader,
            HWPTAG_LIST_HEADER => HwpTag::ListHeader,
            other => HwpTag::Other(other),
        }
    }
}

/// Split a packed record header into `(tag, level, size)`.
pub fn split_header(header: u32) -> (u16, u16, u32) {
    let tag = (header & 0x3FF) as u16;
    let level = ((header >> 10) & 0x3FF) as u16;
    let size = (header >> 20) & 0xFFF;
    (tag, level, size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwpRecord {
    pub offset: usize,
    pub tag_id: u16,
    pub level: u16,
    pub declared_size: u32,
    pub data_start: usize,
    /// Clipped to the end of the buffer.
    pub data_end: usize,
}

impl HwpRecord {
    pub fn tag(&self) -> HwpTag {
        HwpTag::from_id(self.tag_id)
    }

    pub fn payload<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        buf.get(self.data_start..self.data_end).unwrap_or_default()
    }

    pub fn is_truncated(&self) -> bool {
        ((self.data_end - self.data_start) as u64) < u64::from(self.declared_size)
    }
}

#[derive(Debug, Clone)]
pub struct HwpRecordIter<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl Iterator for HwpRecordIter<'_> {
    type Item = HwpRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        let header = read_u32(self.buf, offset)?;
        let (tag_id, level, mut size) = split_header(header);
        let mut data_start = offset + 4;
        if size == SIZE_ESCAPE {
            let Some(extended) = read_u32(self.buf, data_start) else {
                log::warn!("HWP record at offset {offset}: extended size is cut off");
                self.offset = self.buf.len();
                return None;
            };
            size = extended;
            data_start += 4;
        }

        let declared_end = data_start.saturating_add(size as usize);
        let data_end = declared_end.min(self.buf.len());
        if data_end < declared_end {
            log::warn!(
                "HWP record tag {tag_id} at offset {offset} declares {size} bytes, only {} remain; \
                 payload clipped",
                data_end - data_start
            );
        }
        self.offset = data_end;
        Some(HwpRecord {
            offset,
            tag_id,
            level,
            declared_size: size,
            data_start,
            data_end,
        })
    }
}

/// Iterate the records of a decompressed section (or `DocInfo`) stream.
pub fn parse_records(buf: &[u8]) -> HwpRecordIter<'_> {
    HwpRecordIter { buf, offset: 0 }
}

pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let b = buf.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
