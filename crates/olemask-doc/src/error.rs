use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocError {
    #[error("WordDocument stream is {len} bytes, too short for a FIB")]
    FibTooShort { len: usize },
    #[error("FIB wIdent is {ident:#06x}, expected 0xa5ec")]
    BadIdent { ident: u16 },
    #[error("document is encrypted (fEncrypted)")]
    Encrypted,
    #[error("piece {index} spans bytes {start}..{end} of a {len}-byte WordDocument stream")]
    PieceOutOfBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}
