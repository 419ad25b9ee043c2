//! `BinData/*.OLE` embedded objects: a small storage prefix followed by a compound file.

use olemask_cfb::MAGIC;

/// Offset of the first compound-file signature in a decoded `BinData` object. The storage
/// prefix in front of it varies in length (an `Ole10Native` header carries file names).
pub fn find_embedded_cfb(bytes: &[u8]) -> Option<usize> {
    bytes.windows(MAGIC.len()).position(|w| w == MAGIC)
}

/// Whether a `BinData` stream name refers to an embedded OLE object.
pub fn is_ole_bindata(path: &str) -> bool {
    let Some((dir, name)) = path.rsplit_once('/') else {
        return false;
    };
    dir.eq_ignore_ascii_case("BinData")
        && name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("ole"))
}

/// Whether a stream path is a body section (`BodyText/Section<N>`).
pub fn is_body_section(path: &str) -> bool {
    path.split_once('/').is_some_and(|(dir, name)| {
        dir.eq_ignore_ascii_case("BodyText")
            && name.len() > 7
            && name.get(..7).is_some_and(|p| p.eq_ignore_ascii_case("Section"))
            && name[7..].bytes().all(|b| b.is_ascii_digit())
    })
}
