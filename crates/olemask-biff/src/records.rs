use olemask_core::StreamBuffer;

use crate::error::BiffError;

pub const RECORD_HEADER: u16 = 0x0014;
pub const RECORD_FOOTER: u16 = 0x0015;
pub const RECORD_EOF: u16 = 0x000A;
pub const RECORD_FILEPASS: u16 = 0x002F;
pub const RECORD_CONTINUE: u16 = 0x003C;
pub const RECORD_CODEPAGE: u16 = 0x0042;
pub const RECORD_SST: u16 = 0x00FC;
pub const RECORD_LABELSST: u16 = 0x00FD;
pub const RECORD_TXO: u16 = 0x01B6;
pub const RECORD_RSTRING: u16 = 0x00D6;
pub const RECORD_LABEL: u16 = 0x0204;
pub const RECORD_BOF: u16 = 0x0809;
pub const RECORD_FRTWRAPPER: u16 = 0x0851;
pub const RECORD_SERIESTEXT: u16 = 0x100D;

/// Chart records that carry strings in layouts not modelled field by field. Their payloads are
/// scanned for XLUnicodeStrings with one-byte resynchronization.
pub const CHART_STRING_LIKE: [u16; 5] = [0x1024, 0x1025, 0x1026, 0x104B, 0x105C];

// BIFF version numbers stored in the BOF payload [MS-XLS 2.4.21].
const BOF_VERSION_BIFF5: u16 = 0x0500;
const BOF_VERSION_BIFF8: u16 = 0x0600;
// Substream type some BIFF5 writers pair with a zero version.
const BOF_DT_WORKSHEET: u16 = 0x1000;

/// `CODEPAGE` value meaning "UTF-16", which says nothing about compressed strings.
pub const CODEPAGE_UTF16: u16 = 1200;

// Hard caps for coalescing `CONTINUE` records into one logical payload. A malformed stream can
// carry arbitrarily long runs of `CONTINUE` records.
const MAX_LOGICAL_RECORD_BYTES: usize = 16 * 1024 * 1024;
const MAX_LOGICAL_RECORD_FRAGMENTS: usize = 4096;

/// Record dispatch for the redaction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiffRecordKind {
    Bof,
    Eof,
    CodePage,
    FilePass,
    Continue,
    Sst,
    LabelSst,
    Label,
    RString,
    Header,
    Footer,
    Txo,
    SeriesText,
    FrtWrapper,
    ChartStringLike(u16),
    Other(u16),
}

impl BiffRecordKind {
    pub fn from_opcode(opcode: u16) -> Self {
        match opcode {
            RECORD_BOF => BiffRecordKind::Bof,
            RECORD_EOF => BiffRecordKind::Eof,
            RECORD_CODEPAGE => BiffRecordKind::CodePage,
            RECORD_FILEPASS => BiffRecordKind::FilePass,
            RECORD_CONTINUE => BiffRecordKind::Continue,
            RECORD_SST => BiffRecordKind::Sst,
            RECORD_LABELSST => BiffRecordKind::LabelSst,
            RECORD_LABEL => BiffRecordKind::Label,
            RECORD_RSTRING => BiffRecordKind::RString,
            RECORD_HEADER => BiffRecordKind::Header,
            RECORD_FOOTER => BiffRecordKind::Footer,
            RECORD_TXO => BiffRecordKind::Txo,
            RECORD_SERIESTEXT => BiffRecordKind::SeriesText,
            RECORD_FRTWRAPPER => BiffRecordKind::FrtWrapper,
            op if CHART_STRING_LIKE.contains(&op) => BiffRecordKind::ChartStringLike(op),
            op => BiffRecordKind::Other(op),
        }
    }
}

/// String layout generation of a workbook stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiffVersion {
    /// Excel 5/95 (`Book` streams): 8-bit code-page strings without a flags byte.
    Biff5,
    /// Excel 97 and later: XLUnicodeStrings.
    Biff8,
}

/// BOF opcodes of every BIFF generation.
pub fn is_bof_record(opcode: u16) -> bool {
    matches!(opcode, 0x0009 | 0x0209 | 0x0409 | RECORD_BOF)
}

/// Read the string generation from the leading BOF. Streams without one are treated as BIFF8.
pub fn detect_biff_version(stream: &[u8]) -> BiffVersion {
    let Some(bof) = read_record(stream, 0).filter(|r| is_bof_record(r.opcode)) else {
        return BiffVersion::Biff8;
    };
    let payload = bof.payload(stream);
    let Some(version) = payload.get(0..2).map(|v| u16::from_le_bytes([v[0], v[1]])) else {
        return BiffVersion::Biff8;
    };
    let dt = payload
        .get(2..4)
        .map(|v| u16::from_le_bytes([v[0], v[1]]))
        .unwrap_or(0);
    match version {
        BOF_VERSION_BIFF5 => BiffVersion::Biff5,
        BOF_VERSION_BIFF8 => BiffVersion::Biff8,
        0 if dt == BOF_DT_WORKSHEET => BiffVersion::Biff5,
        _ => BiffVersion::Biff8,
    }
}

/// One physical record. Positions are relative to the stream it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiffRecord {
    /// Offset of the 4-byte header.
    pub offset: usize,
    pub opcode: u16,
    /// Length declared in the header.
    pub declared_len: u16,
    pub data_start: usize,
    /// End of the payload actually present; short of `data_start + declared_len` when truncated.
    pub data_end: usize,
}

impl BiffRecord {
    pub fn kind(&self) -> BiffRecordKind {
        BiffRecordKind::from_opcode(self.opcode)
    }

    pub fn payload<'a>(&self, stream: &'a [u8]) -> &'a [u8] {
        stream.get(self.data_start..self.data_end).unwrap_or_default()
    }

    pub fn payload_len(&self) -> usize {
        self.data_end - self.data_start
    }

    /// Offset of the next record.
    pub fn end(&self) -> usize {
        self.data_end
    }

    pub fn is_truncated(&self) -> bool {
        self.payload_len() < self.declared_len as usize
    }
}

/// Iterator over physical records.
///
/// Stops once fewer than 4 bytes remain. A record whose declared length runs past the end of the
/// stream is yielded with its payload clipped to the available bytes (see
/// [`BiffRecord::is_truncated`]) and ends the iteration.
#[derive(Debug, Clone)]
pub struct BiffRecordIter<'a> {
    stream: &'a [u8],
    offset: usize,
}

impl<'a> BiffRecordIter<'a> {
    pub fn from_offset(stream: &'a [u8], offset: usize) -> Self {
        Self {
            stream,
            offset: offset.min(stream.len()),
        }
    }
}

impl Iterator for BiffRecordIter<'_> {
    type Item = BiffRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.stream.get(self.offset..self.offset.checked_add(4)?)?;
        let opcode = u16::from_le_bytes([header[0], header[1]]);
        let declared_len = u16::from_le_bytes([header[2], header[3]]);

        let offset = self.offset;
        let data_start = offset + 4;
        let data_end = (data_start + declared_len as usize).min(self.stream.len());
        self.offset = data_end;
        Some(BiffRecord {
            offset,
            opcode,
            declared_len,
            data_start,
            data_end,
        })
    }
}

pub fn iterate_records(stream: &[u8]) -> BiffRecordIter<'_> {
    BiffRecordIter::from_offset(stream, 0)
}

/// Read the single record at `offset`.
pub fn read_record(stream: &[u8], offset: usize) -> Option<BiffRecord> {
    BiffRecordIter::from_offset(stream, offset).next()
}

/// A payload byte range in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A record payload joined with the payloads of the `CONTINUE` records that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coalesced {
    pub merged: Vec<u8>,
    /// One entry per physical fragment, in `merged` order.
    pub segments: Vec<Segment>,
    /// Offset of the first record after the last coalesced `CONTINUE`.
    pub next_offset: usize,
}

impl Coalesced {
    /// Cumulative end of each fragment within `merged`.
    pub fn fragment_ends(&self) -> Vec<usize> {
        self.segments
            .iter()
            .scan(0usize, |end, seg| {
                *end += seg.len();
                Some(*end)
            })
            .collect()
    }

    /// Map a position in `merged` back to the stream.
    pub fn stream_offset(&self, merged_pos: usize) -> Option<usize> {
        let mut base = 0usize;
        for seg in &self.segments {
            if merged_pos < base + seg.len() {
                return Some(seg.start + (merged_pos - base));
            }
            base += seg.len();
        }
        None
    }
}

/// Join the record at `record_offset` with every immediately following `CONTINUE` record.
pub fn coalesce_with_continue(stream: &[u8], record_offset: usize) -> Option<Coalesced> {
    let first = read_record(stream, record_offset)?;
    let mut merged = first.payload(stream).to_vec();
    let mut segments = vec![Segment {
        start: first.data_start,
        end: first.data_end,
    }];
    let mut next_offset = first.end();

    while let Some(record) = read_record(stream, next_offset) {
        if record.opcode != RECORD_CONTINUE {
            break;
        }
        if segments.len() >= MAX_LOGICAL_RECORD_FRAGMENTS
            || merged.len() + record.payload_len() > MAX_LOGICAL_RECORD_BYTES
        {
            log::warn!(
                "record 0x{:04X} at offset {record_offset}: too many CONTINUE fragments; \
                 coalescing stopped at offset {next_offset}",
                first.opcode
            );
            break;
        }
        merged.extend_from_slice(record.payload(stream));
        segments.push(Segment {
            start: record.data_start,
            end: record.data_end,
        });
        next_offset = record.end();
    }

    Some(Coalesced {
        merged,
        segments,
        next_offset,
    })
}

/// Split `merged` over the original fragment boundaries and write every fragment whose bytes
/// changed. Returns the number of fragments written.
///
/// `merged` must be exactly as long as the segments it came from; nothing is written otherwise.
pub fn write_back_merged(
    target: &mut StreamBuffer,
    segments: &[Segment],
    merged: &[u8],
) -> Result<usize, BiffError> {
    let expected: usize = segments.iter().map(Segment::len).sum();
    if merged.len() != expected {
        return Err(BiffError::MergedLengthMismatch {
            expected,
            actual: merged.len(),
        });
    }
    if let Some(seg) = segments.iter().find(|s| s.end > target.len()) {
        return Err(BiffError::SegmentOutOfBounds {
            start: seg.start,
            end: seg.end,
            len: target.len(),
        });
    }

    let mut written = 0usize;
    let mut pos = 0usize;
    for seg in segments {
        let chunk = &merged[pos..pos + seg.len()];
        pos += seg.len();
        if target.bytes()[seg.start..seg.end] == *chunk {
            continue;
        }
        let span = target.span(seg.start, seg.len());
        target.write(span, chunk)?;
        written += 1;
    }
    Ok(written)
}

/// The workbook's `CODEPAGE`, if the globals substream declares one.
pub fn detect_codepage(stream: &[u8]) -> Option<u16> {
    for record in iterate_records(stream) {
        match record.kind() {
            BiffRecordKind::CodePage => {
                let payload = record.payload(stream);
                if payload.len() >= 2 {
                    return Some(u16::from_le_bytes([payload[0], payload[1]]));
                }
            }
            BiffRecordKind::Eof => break,
            _ => {}
        }
    }
    None
}

/// Whether the workbook globals carry a `FILEPASS` record, i.e. every payload after it is
/// ciphertext.
pub fn has_filepass(stream: &[u8]) -> bool {
    let mut records = iterate_records(stream);
    // Workbook streams start with BOF; anything else is not ours to judge.
    if records.next().map(|r| r.opcode) != Some(RECORD_BOF) {
        return false;
    }
    for record in records {
        match record.kind() {
            BiffRecordKind::FilePass => return true,
            BiffRecordKind::Eof | BiffRecordKind::Bof => break,
            _ => {}
        }
    }
    false
}
