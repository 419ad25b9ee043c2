use std::collections::HashSet;

use olemask_core::StreamBuffer;

use crate::chain::{
    collect_sectors, walk_chain, ChainResolution, ChainStatus, ENDOFCHAIN, FREESECT,
};
use crate::directory::{assign_paths, DirEntry, ObjectType, DIR_ENTRY_LEN};
use crate::error::CfbError;
use crate::header::{read_u32, Header};

/// Parsed allocation tables and directory of an in-memory compound file.
///
/// The container bytes are not owned: every read or write takes the buffer explicitly and
/// checks that it still has the length it was parsed at.
#[derive(Debug, Clone)]
pub struct CompoundFile {
    header: Header,
    container_len: usize,
    fat: Vec<u32>,
    mini_fat: Vec<u32>,
    entries: Vec<DirEntry>,
    /// Big-sector chain of the root entry, which stores every mini sector.
    mini_stream: ChainResolution,
}

impl CompoundFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, CfbError> {
        let header = Header::parse(bytes)?;
        let sector_size = header.sector_size();

        let fat_sectors = fat_sector_ids(bytes, &header)?;
        let mut fat = Vec::with_capacity(fat_sectors.len() * sector_size / 4);
        for &sector in &fat_sectors {
            let data = sector_bytes(bytes, sector, sector_size)?;
            fat.extend(data.chunks_exact(4).map(|c| read_u32(c, 0)));
        }

        let dir_sectors = collect_sectors(&fat, header.first_dir_sector).map_err(|status| {
            CfbError::BrokenMetadataChain {
                what: "directory",
                status,
            }
        })?;
        let mut entries = Vec::new();
        for &sector in &dir_sectors {
            let data = sector_bytes(bytes, sector, sector_size)?;
            for raw in data.chunks_exact(DIR_ENTRY_LEN) {
                let id = entries.len() as u32;
                entries.push(DirEntry::parse(id, raw, header.major_version));
            }
        }
        match entries.first() {
            Some(root) if root.object_type == ObjectType::Root => {}
            _ => return Err(CfbError::MissingRoot),
        }
        assign_paths(&mut entries);

        let mini_fat = match read_mini_fat(bytes, &header, &fat) {
            Ok(table) => table,
            Err(err) => {
                log::warn!("ignoring unreadable MiniFAT, small streams will be skipped: {err}");
                Vec::new()
            }
        };

        let container_len = bytes.len();
        let root = &entries[0];
        // Round up to whole mini sectors so the last root sector may be short on disk.
        let mini_len = usize::try_from(root.size)
            .unwrap_or(usize::MAX)
            .div_ceil(header.mini_sector_size())
            .saturating_mul(header.mini_sector_size());
        let mini_stream = walk_chain(&fat, root.start_sector, mini_len, sector_size, |s, len| {
            big_sector_offset(s, len, sector_size, container_len)
        });
        if mini_stream.status != ChainStatus::Complete {
            log::warn!("mini stream chain: {}", mini_stream.status);
        }

        log::debug!(
            "compound file v{}: {} byte sectors, {} FAT entries, {} directory entries",
            header.major_version,
            sector_size,
            fat.len(),
            entries.len()
        );

        Ok(Self {
            header,
            container_len,
            fat,
            mini_fat,
            entries,
            mini_stream,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn sector_size(&self) -> usize {
        self.header.sector_size()
    }

    pub fn mini_sector_size(&self) -> usize {
        self.header.mini_sector_size()
    }

    pub fn mini_stream_cutoff(&self) -> u64 {
        u64::from(self.header.mini_stream_cutoff)
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    pub fn root(&self) -> &DirEntry {
        // `parse` refuses directories without a root entry.
        &self.entries[0]
    }

    /// Stream entries reachable from the root, in directory order.
    pub fn streams(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_stream() && !e.path.is_empty())
    }

    /// Look up a stream by path. OLE names compare case-insensitively.
    pub fn find_stream(&self, path: &str) -> Option<&DirEntry> {
        let path = path.trim_start_matches('/');
        self.streams().find(|e| e.path.eq_ignore_ascii_case(path))
    }

    /// Whether `entry` lives in the mini stream.
    pub fn is_mini(&self, entry: &DirEntry) -> bool {
        entry.is_stream() && entry.size < self.mini_stream_cutoff()
    }

    pub fn resolve_big_chain(&self, start_sector: u32, byte_len: usize) -> ChainResolution {
        let sector_size = self.sector_size();
        let container_len = self.container_len;
        walk_chain(&self.fat, start_sector, byte_len, sector_size, |s, len| {
            big_sector_offset(s, len, sector_size, container_len)
        })
    }

    pub fn resolve_mini_chain(&self, start_mini_sector: u32, byte_len: usize) -> ChainResolution {
        let sector_size = self.sector_size();
        let mini_size = self.mini_sector_size();
        let backing = &self.mini_stream;
        walk_chain(&self.mini_fat, start_mini_sector, byte_len, mini_size, |s, len| {
            let mini_offset = (s as usize).checked_mul(mini_size)?;
            let chunk = backing.chunks.get(mini_offset / sector_size)?;
            let within = mini_offset % sector_size;
            (within + len <= chunk.len).then_some(chunk.offset + within)
        })
    }

    /// Resolve the whole chain of a stream entry.
    pub fn resolve_entry(&self, entry: &DirEntry) -> ChainResolution {
        let size = usize::try_from(entry.size).unwrap_or(usize::MAX);
        self.resolve(entry.start_sector, size, self.is_mini(entry))
    }

    fn resolve(&self, start_sector: u32, byte_len: usize, is_mini: bool) -> ChainResolution {
        if is_mini {
            self.resolve_mini_chain(start_sector, byte_len)
        } else {
            self.resolve_big_chain(start_sector, byte_len)
        }
    }

    /// Reassemble a stream. A chain that ends early yields the resolved prefix; a broken chain is
    /// an error for this stream only.
    pub fn read_stream(&self, container: &[u8], entry: &DirEntry) -> Result<Vec<u8>, CfbError> {
        self.check_container(container.len())?;
        let resolution = self.resolve_entry(entry);
        match resolution.status {
            ChainStatus::Complete => {}
            ChainStatus::EndedEarly { missing } => {
                log::warn!(
                    "stream `{}` is truncated: {missing} of {} bytes unreachable",
                    entry.path,
                    entry.size
                );
            }
            status => {
                return Err(CfbError::BrokenStreamChain {
                    stream: entry.path.clone(),
                    status,
                })
            }
        }
        Ok(resolution.gather(container))
    }

    /// Copy `new_bytes` over the chain starting at `start_sector`. Bytes past `new_bytes.len()`
    /// are left alone; bytes past the chain's end are dropped and reported in the returned status.
    pub fn overwrite(
        &self,
        container: &mut [u8],
        start_sector: u32,
        new_bytes: &[u8],
        is_mini: bool,
    ) -> Result<ChainStatus, CfbError> {
        self.check_container(container.len())?;
        let resolution = self.resolve(start_sector, new_bytes.len(), is_mini);
        if resolution.status.is_broken() {
            return Err(CfbError::BrokenStreamChain {
                stream: format!("chain at sector {start_sector:#x}"),
                status: resolution.status,
            });
        }
        let mut pos = 0usize;
        for chunk in &resolution.chunks {
            container[chunk.offset..chunk.offset + chunk.len]
                .copy_from_slice(&new_bytes[pos..pos + chunk.len]);
            pos += chunk.len;
        }
        Ok(resolution.status)
    }

    /// Replace a stream's leading bytes with `new_bytes`, which may not exceed the stream size.
    pub fn overwrite_stream(
        &self,
        container: &mut [u8],
        entry: &DirEntry,
        new_bytes: &[u8],
    ) -> Result<ChainStatus, CfbError> {
        if new_bytes.len() as u64 > entry.size {
            return Err(CfbError::WriteTooLarge {
                stream: entry.path.clone(),
                len: new_bytes.len(),
                size: entry.size,
            });
        }
        self.overwrite(container, entry.start_sector, new_bytes, self.is_mini(entry))
            .map_err(|err| match err {
                CfbError::BrokenStreamChain { status, .. } => CfbError::BrokenStreamChain {
                    stream: entry.path.clone(),
                    status,
                },
                other => other,
            })
    }

    /// Flush only the dirty spans of `stream` (a buffer read from `entry`) back into the
    /// container.
    pub fn write_spans(
        &self,
        container: &mut [u8],
        entry: &DirEntry,
        stream: &StreamBuffer,
    ) -> Result<ChainStatus, CfbError> {
        self.check_container(container.len())?;
        let id = entry.buffer_id();
        if let Some(span) = stream.dirty_spans().iter().find(|s| s.buffer != id) {
            return Err(CfbError::ForeignSpan {
                span: *span,
                stream: id,
            });
        }
        if !stream.is_dirty() {
            return Ok(ChainStatus::Complete);
        }

        let resolution = self.resolve_entry(entry);
        if resolution.status.is_broken() {
            return Err(CfbError::BrokenStreamChain {
                stream: entry.path.clone(),
                status: resolution.status,
            });
        }

        let source = stream.bytes();
        let mut dropped = 0usize;
        for span in stream.dirty_spans() {
            let mut written = 0usize;
            for piece in resolution.locate(span.range()) {
                let Some(bytes) = source.get(piece.stream_offset..piece.stream_offset + piece.len)
                else {
                    break;
                };
                container[piece.container_offset..piece.container_offset + piece.len]
                    .copy_from_slice(bytes);
                written += piece.len;
            }
            dropped += span.len - written.min(span.len);
        }
        if dropped > 0 {
            log::warn!(
                "stream `{}`: {dropped} masked bytes lie past the end of its chain",
                entry.path
            );
            return Ok(ChainStatus::EndedEarly { missing: dropped });
        }
        Ok(resolution.status)
    }

    fn check_container(&self, actual: usize) -> Result<(), CfbError> {
        if actual != self.container_len {
            return Err(CfbError::ContainerMismatch {
                expected: self.container_len,
                actual,
            });
        }
        Ok(())
    }
}

fn big_sector_offset(
    sector: u32,
    len: usize,
    sector_size: usize,
    container_len: usize,
) -> Option<usize> {
    let offset = (sector as usize).checked_add(1)?.checked_mul(sector_size)?;
    (offset.checked_add(len)? <= container_len).then_some(offset)
}

fn sector_bytes(bytes: &[u8], sector: u32, sector_size: usize) -> Result<&[u8], CfbError> {
    big_sector_offset(sector, sector_size, sector_size, bytes.len())
        .map(|offset| &bytes[offset..offset + sector_size])
        .ok_or(CfbError::SectorOutOfRange { sector })
}

/// FAT sector locations from the header DIFAT plus any DIFAT sectors.
fn fat_sector_ids(bytes: &[u8], header: &Header) -> Result<Vec<u32>, CfbError> {
    let is_sector = |s: &u32| *s != FREESECT && *s != ENDOFCHAIN;
    let mut ids: Vec<u32> = header.difat.iter().copied().filter(is_sector).collect();

    let sector_size = header.sector_size();
    let per_sector = sector_size / 4 - 1;
    let mut seen = HashSet::new();
    let mut next = header.first_difat_sector;
    let mut remaining = header.num_difat_sectors;
    while is_sector(&next) && remaining > 0 {
        if !seen.insert(next) {
            return Err(CfbError::BrokenMetadataChain {
                what: "DIFAT",
                status: ChainStatus::Cycle { sector: next },
            });
        }
        let data = sector_bytes(bytes, next, sector_size)?;
        ids.extend(
            (0..per_sector)
                .map(|i| read_u32(data, i * 4))
                .filter(is_sector),
        );
        next = read_u32(data, per_sector * 4);
        remaining -= 1;
    }

    let declared = header.num_fat_sectors as usize;
    if declared > 0 && ids.len() > declared {
        ids.truncate(declared);
    }
    Ok(ids)
}

fn read_mini_fat(bytes: &[u8], header: &Header, fat: &[u32]) -> Result<Vec<u32>, CfbError> {
    if header.num_mini_fat_sectors == 0 || header.first_mini_fat_sector == ENDOFCHAIN {
        return Ok(Vec::new());
    }
    let sectors = collect_sectors(fat, header.first_mini_fat_sector).map_err(|status| {
        CfbError::BrokenMetadataChain {
            what: "MiniFAT",
            status,
        }
    })?;
    let sector_size = header.sector_size();
    let mut table = Vec::with_capacity(sectors.len() * sector_size / 4);
    for sector in sectors {
        let data = sector_bytes(bytes, sector, sector_size)?;
        table.extend(data.chunks_exact(4).map(|c| read_u32(c, 0)));
    }
    Ok(table)
}
