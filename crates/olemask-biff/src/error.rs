use olemask_core::MaskError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BiffError {
    #[error("merged payload is {actual} bytes but its segments hold {expected}")]
    MergedLengthMismatch { expected: usize, actual: usize },
    #[error("segment {start}..{end} lies outside a {len}-byte stream")]
    SegmentOutOfBounds { start: usize, end: usize, len: usize },
    #[error(transparent)]
    Mask(#[from] MaskError),
}
