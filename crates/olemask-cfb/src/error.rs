use olemask_core::{BufferId, SpanRef};
use thiserror::Error;

use crate::chain::ChainStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CfbError {
    #[error("container is {len} bytes, shorter than the 512-byte header")]
    TooShort { len: usize },
    #[error("missing compound file signature")]
    BadSignature,
    #[error("unsupported sector shift {0}")]
    UnsupportedSectorShift(u16),
    #[error("unsupported mini sector shift {0}")]
    UnsupportedMiniSectorShift(u16),
    #[error("sector {sector:#x} lies outside the container")]
    SectorOutOfRange { sector: u32 },
    #[error("{what} chain is broken: {status}")]
    BrokenMetadataChain {
        what: &'static str,
        status: ChainStatus,
    },
    #[error("directory has no root entry")]
    MissingRoot,
    #[error("chain of stream `{stream}` is broken: {status}")]
    BrokenStreamChain { stream: String, status: ChainStatus },
    #[error("cannot write {len} bytes into stream `{stream}` of {size} bytes")]
    WriteTooLarge {
        stream: String,
        len: usize,
        size: u64,
    },
    #[error("container is {actual} bytes but was parsed at {expected}")]
    ContainerMismatch { expected: usize, actual: usize },
    #[error("span {span} does not belong to stream buffer {stream}")]
    ForeignSpan { span: SpanRef, stream: BufferId },
}
