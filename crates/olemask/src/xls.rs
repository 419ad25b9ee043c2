//! Excel 97-2003 workbooks.

use olemask_cfb::CompoundFile;
use olemask_core::{MaskContext, RedactionReport};

use crate::detect::Format;
use crate::embedded::redact_streams;
use crate::Error;

/// The workbook stream plus every chart or embedded object stored beside it. BIFF5 files name
/// the workbook stream `Book`.
pub(crate) fn redact(
    ctx: &MaskContext<'_>,
    cfb: &CompoundFile,
    container: &mut [u8],
    report: &mut RedactionReport,
) -> Result<usize, Error> {
    if cfb.find_stream("Workbook").is_none() && cfb.find_stream("Book").is_none() {
        return Err(Error::MissingStream {
            format: Format::Xls,
            stream: "Workbook",
        });
    }
    Ok(redact_streams(ctx, cfb, container, report))
}
