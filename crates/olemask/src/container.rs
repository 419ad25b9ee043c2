//! Moving stream bytes between a container buffer and the codecs.

use olemask_cfb::{ChainStatus, CompoundFile, DirEntry};
use olemask_core::{RedactionReport, StreamBuffer};

/// Read `entry` into a buffer tagged with its stream id. An unreadable chain is a warning and
/// yields `None`.
pub(crate) fn load_stream(
    cfb: &CompoundFile,
    container: &[u8],
    entry: &DirEntry,
    report: &mut RedactionReport,
) -> Option<StreamBuffer> {
    match cfb.read_stream(container, entry) {
        Ok(bytes) => Some(StreamBuffer::new(entry.buffer_id(), bytes)),
        Err(err) => {
            report.warn(&entry.path, format!("stream skipped: {err}"));
            None
        }
    }
}

/// Scatter the dirty spans of `stream` back over `entry`'s chain. Returns `hits` when the masks
/// landed (possibly clipped by a short chain) and 0 when the write was abandoned.
pub(crate) fn flush_stream(
    cfb: &CompoundFile,
    container: &mut [u8],
    entry: &DirEntry,
    stream: &StreamBuffer,
    hits: usize,
    report: &mut RedactionReport,
) -> usize {
    if !stream.is_dirty() {
        return hits;
    }
    match cfb.write_spans(container, entry, stream) {
        Ok(ChainStatus::Complete) => hits,
        Ok(status) => {
            report.warn(&entry.path, format!("masks partially written: {status}"));
            hits
        }
        Err(err) => {
            report.warn(&entry.path, format!("stream write abandoned: {err}"));
            0
        }
    }
}

/// Load `entry`, let `redact` mask it, and flush the result.
pub(crate) fn redact_stream<F>(
    cfb: &CompoundFile,
    container: &mut [u8],
    entry: &DirEntry,
    report: &mut RedactionReport,
    redact: F,
) -> usize
where
    F: FnOnce(&mut StreamBuffer, &mut RedactionReport) -> usize,
{
    let Some(mut stream) = load_stream(cfb, container, entry, report) else {
        return 0;
    };
    let hits = redact(&mut stream, report);
    flush_stream(cfb, container, entry, &stream, hits, report)
}

/// Replace a whole stream (a recompressed section, a rebuilt embedded object) whose length
/// equals the bytes originally read from it.
pub(crate) fn replace_stream(
    cfb: &CompoundFile,
    container: &mut [u8],
    entry: &DirEntry,
    bytes: &[u8],
    hits: usize,
    report: &mut RedactionReport,
) -> usize {
    match cfb.overwrite_stream(container, entry, bytes) {
        Ok(ChainStatus::Complete) => hits,
        Ok(status) => {
            report.warn(&entry.path, format!("stream partially written: {status}"));
            hits
        }
        Err(err) => {
            report.warn(&entry.path, format!("stream write abandoned: {err}"));
            0
        }
    }
}
