use olemask_core::BufferId;

use crate::header::{read_u16, read_u32, read_u64};

/// Null link in the directory red-black tree.
pub const NOSTREAM: u32 = 0xFFFF_FFFF;

pub(crate) const DIR_ENTRY_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Unallocated,
    Storage,
    Stream,
    Root,
    Unknown(u8),
}

impl ObjectType {
    fn from_byte(b: u8) -> Self {
        match b {
            0 => ObjectType::Unallocated,
            1 => ObjectType::Storage,
            2 => ObjectType::Stream,
            5 => ObjectType::Root,
            other => ObjectType::Unknown(other),
        }
    }
}

/// One 128-byte directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Index in the directory array.
    pub id: u32,
    pub name: String,
    /// Slash-separated path from the root storage (`ObjectPool/_1234/Workbook`). Empty for the
    /// root and for entries that are not reachable from it.
    pub path: String,
    pub object_type: ObjectType,
    pub left: u32,
    pub right: u32,
    pub child: u32,
    pub start_sector: u32,
    pub size: u64,
}

impl DirEntry {
    pub(crate) fn parse(id: u32, bytes: &[u8], major_version: u16) -> Self {
        let name_len = (read_u16(bytes, 0x40) as usize).min(64);
        let units: Vec<u16> = bytes[..name_len]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .take_while(|&u| u != 0)
            .collect();
        let name = String::from_utf16_lossy(&units);

        let mut size = read_u64(bytes, 0x78);
        if major_version == 3 {
            // Version 3 writers may leave garbage in the high dword.
            size &= 0xFFFF_FFFF;
        }

        Self {
            id,
            name,
            path: String::new(),
            object_type: ObjectType::from_byte(bytes[0x42]),
            left: read_u32(bytes, 0x44),
            right: read_u32(bytes, 0x48),
            child: read_u32(bytes, 0x4C),
            start_sector: read_u32(bytes, 0x74),
            size,
        }
    }

    pub fn is_stream(&self) -> bool {
        self.object_type == ObjectType::Stream
    }

    pub fn is_storage(&self) -> bool {
        matches!(self.object_type, ObjectType::Storage | ObjectType::Root)
    }

    /// The buffer id codecs use for spans inside this stream.
    pub fn buffer_id(&self) -> BufferId {
        BufferId(self.id)
    }
}

/// Fill in `path` for every entry reachable from the root (entry 0).
pub(crate) fn assign_paths(entries: &mut [DirEntry]) {
    if entries.is_empty() {
        return;
    }
    let mut visited = vec![false; entries.len()];
    visited[0] = true;
    // (entry id, parent path)
    let mut stack: Vec<(u32, String)> = vec![(entries[0].child, String::new())];
    while let Some((id, parent)) = stack.pop() {
        let index = id as usize;
        if id == NOSTREAM || index >= entries.len() || visited[index] {
            continue;
        }
        visited[index] = true;

        let entry = &entries[index];
        let path = if parent.is_empty() {
            entry.name.clone()
        } else {
            format!("{parent}/{}", entry.name)
        };
        stack.push((entry.left, parent.clone()));
        stack.push((entry.right, parent));
        if entry.is_storage() {
            stack.push((entry.child, path.clone()));
        }
        entries[index].path = path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_entry(name: &str, object_type: u8, left: u32, right: u32, child: u32) -> Vec<u8> {
        let mut out = vec![0u8; DIR_ENTRY_LEN];
        let units: Vec<u16> = name.encode_utf16().collect();
        for (i, u) in units.iter().enumerate() {
            out[i * 2..i * 2 + 2].copy_from_slice(&u.to_le_bytes());
        }
        let name_len = ((units.len() + 1) * 2) as u16;
        out[0x40..0x42].copy_from_slice(&name_len.to_le_bytes());
        out[0x42] = object_type;
        out[0x44..0x48].copy_from_slice(&left.to_le_bytes());
        out[0x48..0x4C].copy_from_slice(&right.to_le_bytes());
        out[0x4C..0x50].copy_from_slice(&child.to_le_bytes());
        out[0x78..0x80].copy_from_slice(&0xDEAD_0000_0000_0010u64.to_le_bytes());
        out
    }

    #[test]
    fn parses_name_type_and_v3_size() {
        let raw = raw_entry("Workbook", 2, NOSTREAM, NOSTREAM, NOSTREAM);
        let entry = DirEntry::parse(1, &raw, 3);
        assert_eq!(entry.name, "Workbook");
        assert_eq!(entry.object_type, ObjectType::Stream);
        assert_eq!(entry.size, 0x10);
        assert_eq!(entry.buffer_id(), BufferId(1));

        let entry = DirEntry::parse(1, &raw, 4);
        assert_eq!(entry.size, 0xDEAD_0000_0000_0010);
    }

    #[test]
    fn builds_paths_through_storages_and_siblings() {
        // Root -> {FileHeader, BodyText -> {Section0}}; entry 4 points back at the root.
        let raws = [
            raw_entry("Root Entry", 5, NOSTREAM, NOSTREAM, 2),
            raw_entry("FileHeader", 2, NOSTREAM, NOSTREAM, NOSTREAM),
            raw_entry("BodyText", 1, 1, NOSTREAM, 3),
            raw_entry("Section0", 2, NOSTREAM, 4, NOSTREAM),
            raw_entry("Loop", 1, NOSTREAM, NOSTREAM, 0),
        ];
        let mut entries: Vec<DirEntry> = raws
            .iter()
            .enumerate()
            .map(|(i, raw)| DirEntry::parse(i as u32, raw, 3))
            .collect();
        assign_paths(&mut entries);

        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["", "FileHeader", "BodyText", "BodyText/Section0", "BodyText/Loop"]
        );
    }
}
