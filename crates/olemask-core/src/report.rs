use serde::Serialize;

/// A recoverable problem confined to one stream. The stream is left as it was (or partially
/// masked, when the message says so) and the rest of the document is still processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactionWarning {
    pub stream: String,
    pub message: String,
}

/// Outcome of redacting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactionReport {
    /// Sensitive spans masked.
    pub hits: usize,
    /// Spans still matching after the output was re-scanned.
    pub residual_hits: usize,
    /// Spans whose write was refused because the replacement length did not match.
    pub refused_spans: usize,
    pub warnings: Vec<RedactionWarning>,
}

impl RedactionReport {
    pub fn warn(&mut self, stream: impl Into<String>, message: impl Into<String>) {
        let warning = RedactionWarning {
            stream: stream.into(),
            message: message.into(),
        };
        log::warn!("{}: {}", warning.stream, warning.message);
        self.warnings.push(warning);
    }

    /// Fold a nested document's report (an embedded OLE object) into this one.
    pub fn absorb(&mut self, prefix: &str, other: RedactionReport) {
        self.hits += other.hits;
        self.residual_hits += other.residual_hits;
        self.refused_spans += other.refused_spans;
        self.warnings
            .extend(other.warnings.into_iter().map(|w| RedactionWarning {
                stream: format!("{prefix}/{}", w.stream),
                message: w.message,
            }));
    }
}
