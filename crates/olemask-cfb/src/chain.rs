use std::fmt;
use std::ops::Range;

pub const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
pub const FREESECT: u32 = 0xFFFF_FFFF;
pub const FATSECT: u32 = 0xFFFF_FFFD;
pub const DIFSECT: u32 = 0xFFFF_FFFC;

/// One contiguous run of stream bytes inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainChunk {
    pub offset: usize,
    pub len: usize,
}

/// How a chain walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    /// Every requested byte was resolved.
    Complete,
    /// `ENDOFCHAIN`/`FREESECT` arrived before the requested length was covered. The resolved
    /// prefix is usable.
    EndedEarly { missing: usize },
    /// A link pointed outside the allocation table, or at bytes outside the container.
    InvalidSector { sector: u32 },
    /// A link revisited a sector already on the chain.
    Cycle { sector: u32 },
    /// More links than the table has entries.
    HopBudgetExhausted { hops: usize },
}

impl ChainStatus {
    /// Broken chains make the whole stream untrustworthy: nothing gets written through them.
    pub fn is_broken(&self) -> bool {
        matches!(
            self,
            ChainStatus::InvalidSector { .. }
                | ChainStatus::Cycle { .. }
                | ChainStatus::HopBudgetExhausted { .. }
        )
    }
}

impl fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStatus::Complete => f.write_str("complete"),
            ChainStatus::EndedEarly { missing } => {
                write!(f, "chain ended {missing} bytes short of the stream size")
            }
            ChainStatus::InvalidSector { sector } => write!(f, "invalid sector {sector:#x}"),
            ChainStatus::Cycle { sector } => write!(f, "chain loops back to sector {sector:#x}"),
            ChainStatus::HopBudgetExhausted { hops } => {
                write!(f, "chain exceeded its hop budget after {hops} links")
            }
        }
    }
}

/// A part of a stream range mapped onto the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalPiece {
    pub container_offset: usize,
    pub stream_offset: usize,
    pub len: usize,
}

/// The ordered container locations a stream occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainResolution {
    pub chunks: Vec<ChainChunk>,
    pub status: ChainStatus,
    /// Sector (or mini sector) size; every chunk but the last is exactly this long.
    pub unit: usize,
}

impl ChainResolution {
    pub fn resolved_len(&self) -> usize {
        self.chunks.iter().map(|c| c.len).sum()
    }

    /// Reassemble the resolved bytes in chain order.
    pub fn gather(&self, container: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.resolved_len());
        for chunk in &self.chunks {
            if let Some(bytes) = container.get(chunk.offset..chunk.offset + chunk.len) {
                out.extend_from_slice(bytes);
            }
        }
        out
    }

    /// Map a stream-relative range onto container offsets. Bytes past the resolved length are
    /// silently dropped; callers compare against [`ChainResolution::resolved_len`].
    pub fn locate(&self, range: Range<usize>) -> Vec<PhysicalPiece> {
        let mut out = Vec::new();
        if self.unit == 0 || range.start >= range.end {
            return out;
        }
        let mut pos = range.start;
        while pos < range.end {
            let index = pos / self.unit;
            let Some(chunk) = self.chunks.get(index) else {
                break;
            };
            let within = pos - index * self.unit;
            if within >= chunk.len {
                break;
            }
            let len = (chunk.len - within).min(range.end - pos);
            out.push(PhysicalPiece {
                container_offset: chunk.offset + within,
                stream_offset: pos,
                len,
            });
            pos += len;
        }
        out
    }
}

/// Walk `table` from `start`, emitting one chunk of at most `unit` bytes per link until
/// `byte_len` bytes are covered.
///
/// `place(sector, len)` maps a link to its container offset, or `None` when the bytes would fall
/// outside the container.
pub(crate) fn walk_chain<F>(
    table: &[u32],
    start: u32,
    byte_len: usize,
    unit: usize,
    mut place: F,
) -> ChainResolution
where
    F: FnMut(u32, usize) -> Option<usize>,
{
    let mut chunks = Vec::new();
    let finish = |chunks, status| ChainResolution {
        chunks,
        status,
        unit,
    };

    let mut visited = vec![false; table.len()];
    let mut remaining = byte_len;
    let mut sector = start;
    let mut hops = 0usize;
    while remaining > 0 {
        if sector == ENDOFCHAIN || sector == FREESECT {
            return finish(chunks, ChainStatus::EndedEarly { missing: remaining });
        }
        let index = sector as usize;
        if index >= table.len() {
            return finish(chunks, ChainStatus::InvalidSector { sector });
        }
        if hops >= table.len() {
            return finish(chunks, ChainStatus::HopBudgetExhausted { hops });
        }
        if visited[index] {
            return finish(chunks, ChainStatus::Cycle { sector });
        }
        visited[index] = true;
        hops += 1;

        let len = remaining.min(unit);
        let Some(offset) = place(sector, len) else {
            return finish(chunks, ChainStatus::InvalidSector { sector });
        };
        chunks.push(ChainChunk { offset, len });
        remaining -= len;
        sector = table[index];
    }
    finish(chunks, ChainStatus::Complete)
}

/// Collect the sector ids of a metadata chain (directory, MiniFAT) up to `ENDOFCHAIN`.
pub(crate) fn collect_sectors(table: &[u32], start: u32) -> Result<Vec<u32>, ChainStatus> {
    let mut out = Vec::new();
    let mut visited = vec![false; table.len()];
    let mut sector = start;
    while sector != ENDOFCHAIN && sector != FREESECT {
        let index = sector as usize;
        if index >= table.len() {
            return Err(ChainStatus::InvalidSector { sector });
        }
        if visited[index] {
            return Err(ChainStatus::Cycle { sector });
        }
        visited[index] = true;
        out.push(sector);
        sector = table[index];
    }
    Ok(out)
}
