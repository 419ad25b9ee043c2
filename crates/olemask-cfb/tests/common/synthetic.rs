//! Hand-laid version 3 compound files with full control over sector placement, for chain tests
//! the `cfb` writer cannot produce (scattered chains, corrupt links).
//!
//! Layout: sector 0 holds the FAT, sector 1 the directory, streams start at sector 2.

const SECTOR: usize = 512;
const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
const FREESECT: u32 = 0xFFFF_FFFF;
const FATSECT: u32 = 0xFFFF_FFFD;
const NOSTREAM: u32 = 0xFFFF_FFFF;

pub struct SyntheticV3 {
    fat: Vec<u32>,
    sectors: Vec<[u8; SECTOR]>,
    /// (name, start sector, size)
    streams: Vec<(String, u32, u32)>,
}

impl Default for SyntheticV3 {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticV3 {
    pub fn new() -> Self {
        Self {
            fat: vec![FATSECT, ENDOFCHAIN],
            sectors: vec![[0u8; SECTOR], [0u8; SECTOR]],
            streams: Vec::new(),
        }
    }

    /// Place `data` in `chain`, in order. Streams should be at least 4096 bytes so they live in
    /// big sectors.
    pub fn add_stream(&mut self, name: &str, data: &[u8], chain: &[u32]) -> &mut Self {
        assert!(self.streams.len() < 3, "one directory sector holds three streams");
        assert!(data.len() <= chain.len() * SECTOR, "chain too short for data");
        for (i, &sector) in chain.iter().enumerate() {
            assert!(sector >= 2, "sectors 0 and 1 hold the FAT and directory");
            let index = sector as usize;
            while self.sectors.len() <= index {
                self.sectors.push([0u8; SECTOR]);
                self.fat.push(FREESECT);
            }
            let start = i * SECTOR;
            let end = data.len().min(start + SECTOR);
            if start < end {
                self.sectors[index][..end - start].copy_from_slice(&data[start..end]);
            }
            self.fat[index] = chain.get(i + 1).copied().unwrap_or(ENDOFCHAIN);
        }
        let start = chain.first().copied().unwrap_or(ENDOFCHAIN);
        self.streams.push((name.to_string(), start, data.len() as u32));
        self
    }

    pub fn set_fat_entry(&mut self, sector: u32, value: u32) -> &mut Self {
        self.fat[sector as usize] = value;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        assert!(self.fat.len() <= SECTOR / 4, "one FAT sector only");
        let mut header = [0u8; SECTOR];
        header[..8].copy_from_slice(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]);
        put_u16(&mut header, 0x18, 0x003E);
        put_u16(&mut header, 0x1A, 3);
        put_u16(&mut header, 0x1C, 0xFFFE);
        put_u16(&mut header, 0x1E, 9);
        put_u16(&mut header, 0x20, 6);
        put_u32(&mut header, 0x2C, 1);
        put_u32(&mut header, 0x30, 1);
        put_u32(&mut header, 0x38, 4096);
        put_u32(&mut header, 0x3C, ENDOFCHAIN);
        put_u32(&mut header, 0x44, ENDOFCHAIN);
        for i in 0..109 {
            put_u32(&mut header, 0x4C + i * 4, FREESECT);
        }
        put_u32(&mut header, 0x4C, 0);

        let mut sectors = self.sectors.clone();
        for (i, entry) in self.fat.iter().enumerate() {
            put_u32(&mut sectors[0], i * 4, *entry);
        }
        for i in self.fat.len()..SECTOR / 4 {
            put_u32(&mut sectors[0], i * 4, FREESECT);
        }

        let mut dir = [0u8; SECTOR];
        let root_child = if self.streams.is_empty() { NOSTREAM } else { 1 };
        write_entry(&mut dir[..128], "Root Entry", 5, NOSTREAM, root_child, ENDOFCHAIN, 0);
        for slot in 1..4 {
            let range = slot * 128..(slot + 1) * 128;
            match self.streams.get(slot - 1) {
                Some((name, start, size)) => {
                    let right = if slot < self.streams.len() {
                        slot as u32 + 1
                    } else {
                        NOSTREAM
                    };
                    write_entry(&mut dir[range], name, 2, right, NOSTREAM, *start, *size);
                }
                None => write_entry(&mut dir[range], "", 0, NOSTREAM, NOSTREAM, 0, 0),
            }
        }
        sectors[1] = dir;

        let mut out = header.to_vec();
        for sector in &sectors {
            out.extend_from_slice(sector);
        }
        out
    }
}

fn write_entry(
    out: &mut [u8],
    name: &str,
    object_type: u8,
    right: u32,
    child: u32,
    start: u32,
    size: u32,
) {
    let units: Vec<u16> = name.encode_utf16().collect();
    for (i, unit) in units.iter().enumerate() {
        put_u16(out, i * 2, *unit);
    }
    let name_len = if units.is_empty() {
        0
    } else {
        (units.len() as u16 + 1) * 2
    };
    put_u16(out, 0x40, name_len);
    out[0x42] = object_type;
    put_u32(out, 0x44, NOSTREAM);
    put_u32(out, 0x48, right);
    put_u32(out, 0x4C, child);
    put_u32(out, 0x74, start);
    put_u32(out, 0x78, size);
}

fn put_u16(out: &mut [u8], offset: usize, value: u16) {
    out[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut [u8], offset: usize, value: u32) {
    out[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// `len` bytes that differ from sector to sector, so misplaced sectors show up.
pub fn patterned(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| ((i * 7 + (i / SECTOR) * 13) as u8).wrapping_add(seed))
        .collect()
}
