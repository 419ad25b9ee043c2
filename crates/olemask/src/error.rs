use olemask_cfb::CfbError;
use olemask_doc::DocError;
use olemask_hwp::HwpError;
use thiserror::Error;

use crate::detect::Format;

/// Document-level failures. Anything confined to one stream is a
/// [`olemask_core::RedactionWarning`] instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not a readable compound file: {0}")]
    Container(#[from] CfbError),
    #[error("{format} document has no `{stream}` stream")]
    MissingStream { format: Format, stream: &'static str },
    #[error(transparent)]
    Hwp(#[from] HwpError),
    #[error(transparent)]
    Doc(#[from] DocError),
}
