//! Word 97-2003 documents.

use olemask_cfb::CompoundFile;
use olemask_core::{MaskContext, RedactionReport, StreamBuffer};
use olemask_doc::{redact_word_document, Fib};

use crate::container::{flush_stream, load_stream};
use crate::detect::Format;
use crate::embedded::redact_streams;
use crate::Error;

/// Body text through the piece table, then charts and objects in `ObjectPool`.
///
/// A `WordDocument` stream without a valid FIB is an error; a missing table stream only leaves
/// the body unscanned.
pub(crate) fn redact(
    ctx: &MaskContext<'_>,
    cfb: &CompoundFile,
    container: &mut [u8],
    report: &mut RedactionReport,
) -> Result<usize, Error> {
    let entry = cfb
        .find_stream("WordDocument")
        .ok_or(Error::MissingStream {
            format: Format::Doc,
            stream: "WordDocument",
        })?
        .clone();
    let mut word_doc = StreamBuffer::new(entry.buffer_id(), cfb.read_stream(container, &entry)?);
    let fib = Fib::parse(word_doc.bytes())?;

    let table_name = fib.table_stream_name();
    let table = match cfb.find_stream(table_name) {
        Some(table_entry) => load_stream(cfb, container, table_entry, report),
        None => {
            report.warn(&entry.path, format!("table stream `{table_name}` is missing"));
            None
        }
    };

    let mut hits = 0usize;
    if let Some(table) = table {
        let body_hits = redact_word_document(ctx, &mut word_doc, table.bytes(), &entry.path, report);
        hits += flush_stream(cfb, container, &entry, &word_doc, body_hits, report);
    }
    hits += redact_streams(ctx, cfb, container, report);
    Ok(hits)
}
