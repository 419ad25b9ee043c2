//! In-place access to OLE compound files (MS-CFB).
//!
//! [`CompoundFile::parse`] decodes the header, FAT, MiniFAT and directory of a container that is
//! already in memory. Streams are then read by walking their sector chains, and written back by
//! scattering bytes over the same chains. Nothing is ever reallocated: a write can only replace
//! bytes that a chain already owns, so the container keeps its exact size and layout.
//!
//! This is the only layer that knows absolute container offsets. Codecs work on stream-relative
//! [`olemask_core::SpanRef`]s and hand them to [`CompoundFile::write_spans`].

mod chain;
mod directory;
mod error;
mod file;
mod header;


pub use chain::{
    ChainChunk, ChainResolution, ChainStatus, PhysicalPiece, DIFSECT, ENDOFCHAIN, FATSECT,
    FREESECT,
};
pub use directory::{DirEntry, ObjectType, NOSTREAM};
pub use error::CfbError;
pub use file::CompoundFile;
pub use header::{Header, MAGIC};

/// Whether `bytes` starts with the compound file signature.
pub fn has_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&MAGIC)
}
