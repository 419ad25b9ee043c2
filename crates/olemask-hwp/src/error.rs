use olemask_core::MaskError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwpError {
    #[error("FileHeader stream is {len} bytes, expected at least 40")]
    FileHeaderTooShort { len: usize },
    #[error("FileHeader signature is not `HWP Document File`")]
    BadSignature,
    #[error("section does not inflate: {0}")]
    Inflate(#[source] std::io::Error),
    #[error("section inflates past {limit} bytes")]
    InflatedTooLarge { limit: usize },
    #[error("section recompresses to {recompressed} bytes but the stream holds {available}")]
    RecompressedTooLarge { recompressed: usize, available: usize },
    #[error("section does not deflate: {0}")]
    Deflate(#[source] std::io::Error),
    #[error(transparent)]
    Mask(#[from] MaskError),
}
