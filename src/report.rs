// Destinations for the end-of-run report

use std::{
    fs,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

// Persists the consolidated report text somewhere outside the core
pub trait ReportSink: Send + Sync + 'static {
    fn write_report(&self, report: &str) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileReportSink {
    path: PathBuf,
}

impl FileReportSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for FileReportSink {
    fn write_report(&self, report: &str) -> std::io::Result<()> {
        fs::write(&self.path, report)
    }
}

// Keeps the most recent report in memory
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    last: Mutex<Option<String>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_report(&self) -> Option<String> {
        self.last.lock().clone()
    }
}

impl ReportSink for MemoryReportSink {
    fn write_report(&self, report: &str) -> std::io::Result<()> {
        *self.last.lock() = Some(report.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path().join("report.txt"));

        sink.write_report("Flight code: BA123\n").unwrap();
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "Flight code: BA123\n");

        // later reports replace earlier ones
        sink.write_report("Flight code: AF001\n").unwrap();
        assert_eq!(fs::read_to_string(sink.path()).unwrap(), "Flight code: AF001\n");
    }

    #[test]
    fn test_file_sink_surfaces_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path().join("missing").join("report.txt"));
        assert!(sink.write_report("x").is_err());
    }

    #[test]
    fn test_memory_sink_keeps_last_report() {
        let sink = MemoryReportSink::new();
        assert!(sink.last_report().is_none());
        sink.write_report("one").unwrap();
        sink.write_report("two").unwrap();
        assert_eq!(sink.last_report().as_deref(), Some("two"));
    }
}
