//! Crawl records and the in-memory sink that collects them

use crate::output::OutputResult;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Header row of the output file
pub const CSV_HEADER: [&str; 2] = ["Title", "Link/Content"];

/// Title used for every record derived from a PDF document
pub const PDF_TITLE: &str = "PDF Content";

/// One output row
///
/// For link rows `title` is the anchor text and `content` the absolute target URL.
/// For PDF rows `title` is [`PDF_TITLE`] and `content` the extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlRecord {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Link/Content")]
    pub content: String,
}

impl CrawlRecord {
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: text.into(),
            content: url.into(),
        }
    }

    pub fn pdf(text: impl Into<String>) -> Self {
        Self {
            title: PDF_TITLE.to_string(),
            content: text.into(),
        }
    }
}

/// Accumulates records for the whole run and writes them out once at the end
///
/// The sink is shared by every visit task; appends are serialized by an internal
/// lock and records keep the order in which they were emitted.
#[derive(Debug, Default)]
pub struct RecordSink {
    records: Mutex<Vec<CrawlRecord>>,
}

impl RecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record
    pub fn emit(&self, record: CrawlRecord) {
        self.lock().push(record);
    }

    /// Appends several records while holding the lock once, keeping them contiguous
    pub fn emit_all(&self, records: impl IntoIterator<Item = CrawlRecord>) {
        self.lock().extend(records);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns a copy of every record emitted so far
    pub fn snapshot(&self) -> Vec<CrawlRecord> {
        self.lock().clone()
    }

    /// Writes every record to `path` as CSV, header first
    ///
    /// The file is created (or truncated) even when no records were emitted, so a
    /// finished crawl always leaves a file with at least the header row.
    pub fn flush(&self, path: &Path) -> OutputResult<usize> {
        let file = std::fs::File::create(path)?;
        let records = self.lock();
        write_records(file, &records)?;
        tracing::info!("Data saved to {}", path.display());
        Ok(records.len())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CrawlRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writes `records` as CSV rows with the `Title,Link/Content` header
///
/// Fields containing commas, quotes or newlines are quoted the standard way.
pub fn write_records<W: Write>(writer: W, records: &[CrawlRecord]) -> OutputResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn to_csv(records: &[CrawlRecord]) -> String {
        let mut buf = Vec::new();
        write_records(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(to_csv(&[]), "Title,Link/Content\n");
    }

    #[test]
    fn test_rows_follow_emit_order() {
        let csv = to_csv(&[
            CrawlRecord::link("About", "https://example.test/about"),
            CrawlRecord::link("Other", "https://other.test/"),
        ]);
        assert_eq!(
            csv,
            "Title,Link/Content\nAbout,https://example.test/about\nOther,https://other.test/\n"
        );
    }

    #[test]
    fn test_embedded_delimiters_are_quoted() {
        let csv = to_csv(&[CrawlRecord::pdf("line one, still one\nline \"two\"")]);
        assert_eq!(
            csv,
            "Title,Link/Content\nPDF Content,\"line one, still one\nline \"\"two\"\"\"\n"
        );
    }

    #[test]
    fn test_pdf_record_title() {
        let record = CrawlRecord::pdf("HelloWorld");
        assert_eq!(record.title, PDF_TITLE);
        assert_eq!(record.content, "HelloWorld");
    }

    #[test]
    fn test_sink_emit_and_snapshot() {
        let sink = RecordSink::new();
        assert!(sink.is_empty());

        sink.emit(CrawlRecord::link("A", "https://a.test/"));
        sink.emit_all(vec![
            CrawlRecord::link("B", "https://b.test/"),
            CrawlRecord::pdf("text"),
        ]);

        assert_eq!(sink.len(), 3);
        let snapshot = sink.snapshot();
        assert_eq!(snapshot[0].title, "A");
        assert_eq!(snapshot[2].title, "PDF Content");
    }

    #[test]
    fn test_flush_writes_utf8_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let sink = RecordSink::new();
        sink.emit(CrawlRecord::link("Über uns", "https://example.test/über"));
        let written = sink.flush(&path).unwrap();

        assert_eq!(written, 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Title,Link/Content\nÜber uns,https://example.test/über\n"
        );
    }

    #[test]
    fn test_flush_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let sink = RecordSink::new();
        assert!(sink.flush(&path).is_err());
    }
}
