use std::fmt;

use olemask_cfb::CompoundFile;
use serde::Serialize;

/// Document families handled by [`crate::redact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Hwp,
    Doc,
    Xls,
    /// Any other compound file, such as an object extracted from an `ObjectPool`.
    Ole,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Hwp => "HWP",
            Format::Doc => "Word",
            Format::Xls => "Excel",
            Format::Ole => "OLE",
        })
    }
}

/// Classify a parsed container by its top-level streams.
pub fn detect_format(cfb: &CompoundFile) -> Format {
    if cfb.find_stream("FileHeader").is_some() {
        Format::Hwp
    } else if cfb.find_stream("WordDocument").is_some() {
        Format::Doc
    } else if cfb.find_stream("Workbook").is_some() || cfb.find_stream("Book").is_some() {
        Format::Xls
    } else {
        Format::Ole
    }
}
