//! Same-length PII redaction inside legacy OLE office documents.
//!
//! Each entry point takes the bytes of a compound file, masks every span the
//! [`SensitivityOracle`] reports inside the document's text-bearing streams, and returns a buffer
//! of exactly the input length. Streams are edited where they lie: sector chains, record headers,
//! piece tables and string counts are never rewritten.
//!
//! | Entry point | Streams |
//! |---|---|
//! | [`redact_hwp`] | `BodyText/Section<N>`, `BinData/*.OLE` |
//! | [`redact_doc`] | `WordDocument` body text, `ObjectPool` workbooks and previews |
//! | [`redact_xls`] | `Workbook`/`Book`, chart and preview streams |
//! | [`redact_ole_object`] | any `Workbook`/`Book`, `EPRINT`, `OlePres*` stream |
//!
//! [`redact`] picks one of these from the container's top-level streams.

pub mod cli;
mod container;
mod detect;
mod doc;
mod embedded;
mod error;
mod hwp;
mod xls;

use olemask_cfb::CompoundFile;
use olemask_core::MaskContext;

pub use detect::{detect_format, Format};
pub use error::Error;
pub use olemask_core::{
    LiteralOracle, NormalizedText, RedactionConfig, RedactionReport, RedactionWarning,
    SensitiveSpan, SensitivityOracle,
};

/// A redacted container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redacted {
    /// Same length as the input container.
    pub bytes: Vec<u8>,
    pub report: RedactionReport,
}

type Pass = fn(
    &MaskContext<'_>,
    &CompoundFile,
    &mut [u8],
    &mut RedactionReport,
) -> Result<usize, Error>;

/// Detect the document format and redact accordingly.
pub fn redact(
    container: &[u8],
    oracle: &dyn SensitivityOracle,
    config: &RedactionConfig,
) -> Result<Redacted, Error> {
    let format = detect_format(&CompoundFile::parse(container)?);
    log::debug!("detected {format} container");
    redact_as(format, container, oracle, config)
}

/// Redact `container` as a document of `format`.
pub fn redact_as(
    format: Format,
    container: &[u8],
    oracle: &dyn SensitivityOracle,
    config: &RedactionConfig,
) -> Result<Redacted, Error> {
    let pass: Pass = match format {
        Format::Hwp => hwp::redact,
        Format::Doc => doc::redact,
        Format::Xls => xls::redact,
        Format::Ole => ole_pass,
    };
    run(pass, container, oracle, config)
}

pub fn redact_hwp(
    container: &[u8],
    oracle: &dyn SensitivityOracle,
    config: &RedactionConfig,
) -> Result<Redacted, Error> {
    run(hwp::redact, container, oracle, config)
}

pub fn redact_doc(
    container: &[u8],
    oracle: &dyn SensitivityOracle,
    config: &RedactionConfig,
) -> Result<Redacted, Error> {
    run(doc::redact, container, oracle, config)
}

pub fn redact_xls(
    container: &[u8],
    oracle: &dyn SensitivityOracle,
    config: &RedactionConfig,
) -> Result<Redacted, Error> {
    run(xls::redact, container, oracle, config)
}

/// Redact an embedded object (for example a chart extracted from an `ObjectPool` storage).
pub fn redact_ole_object(
    container: &[u8],
    oracle: &dyn SensitivityOracle,
    config: &RedactionConfig,
) -> Result<Redacted, Error> {
    run(ole_pass, container, oracle, config)
}

fn ole_pass(
    ctx: &MaskContext<'_>,
    cfb: &CompoundFile,
    container: &mut [u8],
    report: &mut RedactionReport,
) -> Result<usize, Error> {
    Ok(embedded::redact_streams(ctx, cfb, container, report))
}

fn run(
    pass: Pass,
    container: &[u8],
    oracle: &dyn SensitivityOracle,
    config: &RedactionConfig,
) -> Result<Redacted, Error> {
    let cfb = CompoundFile::parse(container)?;
    let ctx = MaskContext::new(oracle, config);
    let mut bytes = container.to_vec();
    let mut report = RedactionReport::default();

    report.hits = pass(&ctx, &cfb, &mut bytes, &mut report)?;
    report.refused_spans = ctx.refused_spans();
    if config.verify_after_write && report.hits > 0 {
        match residual_hits(pass, &bytes, oracle, config) {
            Ok(0) => {}
            Ok(residual) => {
                report.residual_hits = residual;
                report.warn(
                    "verify",
                    format!("{residual} sensitive spans still present after writing"),
                );
            }
            Err(err) => report.warn("verify", format!("output could not be re-read: {err}")),
        }
    }
    log::info!(
        "{} spans masked, {} refused, {} warnings",
        report.hits,
        report.refused_spans,
        report.warnings.len()
    );
    Ok(Redacted { bytes, report })
}

/// Run `pass` again over a copy of the output and count what it would still mask.
fn residual_hits(
    pass: Pass,
    output: &[u8],
    oracle: &dyn SensitivityOracle,
    config: &RedactionConfig,
) -> Result<usize, Error> {
    let quiet = RedactionConfig {
        max_log_samples: 0,
        verify_after_write: false,
        ..config.clone()
    };
    let cfb = CompoundFile::parse(output)?;
    let ctx = MaskContext::new(oracle, &quiet);
    let mut scratch = output.to_vec();
    let mut report = RedactionReport::default();
    pass(&ctx, &cfb, &mut scratch, &mut report)
}
