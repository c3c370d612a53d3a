//! Operational helpers: logging, atomic file output, report persistence.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};
use vqa_types::{config::OpsConfig, report::BatchReport, Result, VqaError};

const REPORT_PREFIX: &str = "qa_report";
const LATEST_SUFFIX: &str = "latest";

pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| ops_error(format!("failed to create log filter: {err}")))?;

    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| ops_error(format!("tracing init error: {err}")))?;
    Ok(())
}

pub fn ensure_reports_dir(path: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(path).map_err(|err| {
        persistence_error(format!(
            "failed to create reports dir {}: {err}",
            path.display()
        ))
    })?;
    debug!("Reports directory ready at {:?}", path);
    Ok(path.to_path_buf())
}

/// Writes `bytes` to a temporary file next to `path` and renames it into
/// place, so readers never observe a partially written file.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| {
        persistence_error(format!("failed to stage {}: {err}", path.display()))
    })?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|err| persistence_error(format!("failed to write {}: {err}", path.display())))?;
    tmp.persist(path).map_err(|err| {
        persistence_error(format!("failed to move {} into place: {err}", path.display()))
    })?;
    Ok(())
}

/// Files produced for one persisted report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub archive_json: PathBuf,
    pub latest_json: PathBuf,
    pub archive_markdown: PathBuf,
    pub latest_markdown: PathBuf,
}

/// Persists batch reports as a timestamped archive plus an overwritten
/// "latest" pointer, for both JSON and markdown renderings.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn latest_json_path(&self) -> PathBuf {
        self.dir.join(format!("{REPORT_PREFIX}_{LATEST_SUFFIX}.json"))
    }

    pub fn latest_markdown_path(&self) -> PathBuf {
        self.dir.join(format!("{REPORT_PREFIX}_{LATEST_SUFFIX}.md"))
    }

    pub fn archive_stem(report: &BatchReport) -> String {
        format!(
            "{REPORT_PREFIX}_{}",
            report.timestamp.format("%Y%m%d_%H%M%S")
        )
    }

    pub fn persist(&self, report: &BatchReport, markdown: &str) -> Result<ReportArtifacts> {
        ensure_reports_dir(&self.dir)?;
        let stem = Self::archive_stem(report);
        let artifacts = ReportArtifacts {
            archive_json: self.dir.join(format!("{stem}.json")),
            latest_json: self.latest_json_path(),
            archive_markdown: self.dir.join(format!("{stem}.md")),
            latest_markdown: self.latest_markdown_path(),
        };

        let doc = serde_json::to_string_pretty(report)
            .map_err(|err| persistence_error(format!("failed to serialize report: {err}")))?;
        atomic_write(&artifacts.archive_json, doc.as_bytes())?;
        atomic_write(&artifacts.latest_json, doc.as_bytes())?;
        atomic_write(&artifacts.archive_markdown, markdown.as_bytes())?;
        atomic_write(&artifacts.latest_markdown, markdown.as_bytes())?;

        info!("Report saved: {:?}", artifacts.archive_json);
        info!("Markdown report: {:?}", artifacts.latest_markdown);
        Ok(artifacts)
    }

    pub fn load_latest(&self) -> Result<BatchReport> {
        let path = self.latest_json_path();
        let contents = std::fs::read_to_string(&path).map_err(|err| {
            persistence_error(format!("unable to read {}: {err}", path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            persistence_error(format!("failed to parse {}: {err}", path.display()))
        })
    }
}

pub fn persistence_error(message: impl Into<String>) -> VqaError {
    VqaError::Persistence(message.into())
}

pub fn ops_error(message: impl Into<String>) -> VqaError {
    VqaError::Ops(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use vqa_types::report::{BatchSummary, ScreenStatus};

    fn sample_report() -> BatchReport {
        let mut screens = BTreeMap::new();
        screens.insert("LogoScreen".to_string(), ScreenStatus::MissingCaptured);
        BatchReport {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            screens,
            summary: BatchSummary {
                total: 1,
                missing: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn atomic_write_replaces_existing_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        atomic_write(&path, b"first").expect("write");
        atomic_write(&path, b"second").expect("overwrite");
        assert_eq!(std::fs::read(&path).expect("read"), b"second");
        let leftovers = std::fs::read_dir(dir.path()).expect("list").count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn persist_writes_archive_and_latest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ReportStore::new(dir.path().join("Reports"));
        let report = sample_report();

        let artifacts = store.persist(&report, "# report").expect("persist");
        assert_eq!(
            artifacts.archive_json.file_name().and_then(|n| n.to_str()),
            Some("qa_report_20260314_092653.json")
        );
        assert_eq!(
            std::fs::read(&artifacts.archive_json).expect("archive"),
            std::fs::read(&artifacts.latest_json).expect("latest")
        );
        assert_eq!(
            std::fs::read_to_string(&artifacts.latest_markdown).expect("md"),
            "# report"
        );
        assert_eq!(store.load_latest().expect("load"), report);
    }

    #[test]
    fn unwritable_reports_dir_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").expect("write blocker");
        let store = ReportStore::new(blocker.join("Reports"));
        let err = store
            .persist(&sample_report(), "")
            .expect_err("persist must fail");
        assert!(matches!(err, VqaError::Persistence(_)));
    }
}
