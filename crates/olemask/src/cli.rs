//! Command-line front end: mask literal strings in one document.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::{redact, redact_as, Format, LiteralOracle, Redacted, RedactionConfig, RedactionReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Detect from the container's streams.
    Auto,
    Xls,
    Doc,
    Hwp,
    /// A bare embedded object (chart workbook, presentation cache).
    Ole,
}

impl FormatArg {
    fn format(self) -> Option<Format> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Xls => Some(Format::Xls),
            FormatArg::Doc => Some(Format::Doc),
            FormatArg::Hwp => Some(Format::Hwp),
            FormatArg::Ole => Some(Format::Ole),
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Mask text inside HWP/DOC/XLS files without changing their size.")]
pub struct Args {
    /// Document to redact.
    pub input: PathBuf,

    /// Literal text to mask (repeatable).
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Output path (default: `<stem>_edit.<ext>` next to the input).
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,

    /// Windows code page for 8-bit text that does not declare one.
    #[arg(long, default_value_t = RedactionConfig::default().single_byte_codepage)]
    pub codepage: u16,

    #[arg(long, default_value_t = RedactionConfig::default().mask_char)]
    pub mask_char: char,

    /// Per-document cap on logged hit samples.
    #[arg(long, default_value_t = RedactionConfig::default().max_log_samples)]
    pub max_log_samples: usize,

    /// Treat compressed XLS strings with NUL odd bytes as 8-bit text, not UTF-16.
    #[arg(long)]
    pub no_utf16_fallback: bool,

    /// Skip re-scanning the output.
    #[arg(long)]
    pub no_verify: bool,

    /// Print the redaction report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn config(&self) -> RedactionConfig {
        RedactionConfig {
            single_byte_codepage: self.codepage,
            mask_char: self.mask_char,
            max_log_samples: self.max_log_samples,
            compressed_utf16_fallback: !self.no_utf16_fallback,
            verify_after_write: !self.no_verify,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    input: &'a str,
    output: &'a str,
    #[serde(flatten)]
    report: &'a RedactionReport,
}

/// `report.xls` becomes `report_edit.xls`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_edit.{}", ext.to_string_lossy()),
        None => format!("{stem}_edit"),
    };
    input.with_file_name(name)
}

pub fn run() -> Result<()> {
    run_with_args(Args::parse())
}

pub fn run_with_args(args: Args) -> Result<()> {
    let config = args.config();
    let oracle = LiteralOracle::new(&args.text);
    if oracle.is_empty() {
        bail!("nothing to mask: every literal is empty");
    }

    let input = std::fs::read(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    let Redacted { bytes, report } = match args.format.format() {
        Some(format) => redact_as(format, &input, &oracle, &config),
        None => redact(&input, &oracle, &config),
    }
    .with_context(|| format!("redact {}", args.input.display()))?;

    if bytes.len() != input.len() {
        bail!(
            "refusing to write {}: output is {} bytes, input was {}",
            args.input.display(),
            bytes.len(),
            input.len()
        );
    }
    let output = args.output_path();
    std::fs::write(&output, &bytes).with_context(|| format!("write {}", output.display()))?;

    tracing::info!(
        hits = report.hits,
        residual = report.residual_hits,
        "wrote {}",
        output.display()
    );

    if args.json {
        let input_name = args.input.display().to_string();
        let output_name = output.display().to_string();
        let json = JsonReport {
            input: &input_name,
            output: &output_name,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    if report.residual_hits > 0 {
        bail!("{} sensitive spans survived redaction", report.residual_hits);
    }
    Ok(())
}
