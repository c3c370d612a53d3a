//! Batch comparison runner: resolves each screen's inputs, drives the
//! engine, aggregates the report and persists it.

pub mod fingerprint;
pub mod markdown;

use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{info, warn};
use vqa_ops::{atomic_write, ensure_reports_dir, ReportArtifacts, ReportStore};
use vqa_types::{
    config::{validate_screen_name, PathsConfig, QaConfig},
    report::{BatchReport, BatchSummary, DiffResult, MatchClass, ScreenStatus},
    screen::Screen,
    vision::ImageFrame,
    Result, VqaError,
};
use vqa_vision::{classify, ImageCodec, ScreenComparator};

pub use fingerprint::content_fingerprint;
pub use markdown::render_markdown;

/// Per-screen comparison, independent of every other screen.
pub struct ScreenPipeline<C> {
    paths: PathsConfig,
    comparator: ScreenComparator<C>,
}

impl<C: ImageCodec> ScreenPipeline<C> {
    pub fn new(paths: PathsConfig, codec: C) -> Self {
        Self {
            paths,
            comparator: ScreenComparator::new(codec),
        }
    }

    pub fn resolve(&self, name: &str) -> Screen {
        self.paths.resolve(name)
    }

    /// Missing inputs and undecodable images are returned as statuses;
    /// only output failures are errors.
    pub fn compare_screen(&self, name: &str) -> Result<ScreenStatus> {
        let screen = self.resolve(name);

        if !screen.captured_path.is_file() {
            warn!(
                "{}: no captured screenshot at {:?}",
                name, screen.captured_path
            );
            return Ok(ScreenStatus::MissingCaptured);
        }
        if !screen.reference_path.is_file() {
            warn!("{}: no reference export at {:?}", name, screen.reference_path);
            return Ok(ScreenStatus::MissingReference);
        }

        info!("Comparing {}...", name);
        let loaded = self.load(&screen.captured_path).and_then(|captured| {
            self.load(&screen.reference_path)
                .map(|reference| (captured, reference))
        });
        let ((captured, captured_hash), (reference, reference_hash)) = match loaded {
            Ok(pair) => pair,
            Err(err) if err.is_recoverable() => {
                warn!("{}: {}", name, err);
                return Ok(ScreenStatus::DecodeFailed {
                    error: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        let comparison = self.comparator.compare(&captured, &reference)?;
        let reports_dir = ensure_reports_dir(&self.paths.reports_dir())?;
        let diff_image = screen.diff_image_path(&reports_dir);
        let encoded = self.comparator.encode(&comparison.diff_image)?;
        atomic_write(&diff_image, &encoded)?;

        info!(
            "{} {}: {:.2}% match ({:.2}% pixels differ)",
            comparison.class.glyph(),
            name,
            comparison.match_score,
            comparison.diff_percent
        );

        let (width, height) = comparison.resolution;
        Ok(ScreenStatus::Compared(Box::new(DiffResult {
            mean_diff: comparison.mean_diff,
            max_diff: comparison.max_diff,
            diff_percent: comparison.diff_percent,
            match_score: comparison.match_score,
            resolution: [width, height],
            regions: comparison.region.into_iter().collect(),
            captured_path: screen.captured_path,
            reference_path: screen.reference_path,
            captured_hash,
            reference_hash,
            diff_image,
        })))
    }

    fn load(&self, path: &Path) -> Result<(ImageFrame, String)> {
        let bytes = std::fs::read(path)
            .map_err(|err| VqaError::Decode(format!("unable to read {}: {err}", path.display())))?;
        let frame = self.comparator.decode(&bytes).map_err(|err| match err {
            VqaError::Decode(message) => {
                VqaError::Decode(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;
        Ok((frame, content_fingerprint(&bytes)))
    }
}

/// Buckets every screen by classification band.
pub fn summarize(screens: &BTreeMap<String, ScreenStatus>) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for status in screens.values() {
        match status {
            ScreenStatus::Compared(result) => summary.record_class(classify(result.match_score)),
            ScreenStatus::MissingCaptured | ScreenStatus::MissingReference => {
                summary.record_missing()
            }
            ScreenStatus::DecodeFailed { .. } => summary.record_class(MatchClass::Failing),
        }
    }
    summary
}

/// Report plus the files it was written to.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub report: BatchReport,
    pub artifacts: ReportArtifacts,
}

#[async_trait]
pub trait BatchRunner {
    /// Compares `screens`, or every configured screen when empty, and
    /// persists the report.
    async fn run_batch(&self, screens: &[String]) -> Result<BatchOutcome>;
}

pub struct Orchestrator<C> {
    pipeline: Arc<ScreenPipeline<C>>,
    store: ReportStore,
    screens: Vec<String>,
    concurrency: usize,
}

impl<C> Orchestrator<C>
where
    C: ImageCodec + 'static,
{
    pub fn new(config: QaConfig, codec: C) -> Self {
        let store = ReportStore::new(config.paths.reports_dir());
        Self {
            pipeline: Arc::new(ScreenPipeline::new(config.paths, codec)),
            store,
            screens: config.screens,
            concurrency: config.compare.concurrency.max(1),
        }
    }

    pub fn configured_screens(&self) -> &[String] {
        &self.screens
    }

    pub fn resolve(&self, name: &str) -> Screen {
        self.pipeline.resolve(name)
    }

    pub fn reports_dir(&self) -> &Path {
        self.store.dir()
    }

    /// Same as [`BatchRunner::run_batch`] with an explicit report timestamp.
    pub async fn run_batch_at(
        &self,
        screens: &[String],
        timestamp: DateTime<Utc>,
    ) -> Result<BatchOutcome> {
        let targets = self.targets(screens)?;
        info!(
            "Comparing {} screen(s), {} at a time",
            targets.len(),
            self.concurrency
        );

        let results: Vec<(String, ScreenStatus)> = stream::iter(targets)
            .map(|name| {
                let pipeline = Arc::clone(&self.pipeline);
                async move {
                    let task_name = name.clone();
                    let status =
                        tokio::task::spawn_blocking(move || pipeline.compare_screen(&task_name))
                            .await
                            .map_err(|err| {
                                orchestrator_error(format!("comparison of {name} aborted: {err}"))
                            })??;
                    Ok::<_, VqaError>((name, status))
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let screens: BTreeMap<String, ScreenStatus> = results.into_iter().collect();
        let report = BatchReport {
            timestamp,
            summary: summarize(&screens),
            screens,
        };
        let markdown = render_markdown(&report, self.store.dir());
        let artifacts = self.store.persist(&report, &markdown)?;

        let summary = &report.summary;
        info!(
            "Batch complete: {} total, {} passing, {} warning, {} failing, {} missing",
            summary.total, summary.passing, summary.warning, summary.failing, summary.missing
        );
        Ok(BatchOutcome { report, artifacts })
    }

    fn targets(&self, requested: &[String]) -> Result<Vec<String>> {
        let names = if requested.is_empty() {
            &self.screens
        } else {
            requested
        };
        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(names.len());
        for name in names {
            validate_screen_name(name)?;
            if seen.insert(name.as_str()) {
                targets.push(name.clone());
            }
        }
        if targets.is_empty() {
            return Err(orchestrator_error("no screens to compare"));
        }
        Ok(targets)
    }
}

#[async_trait]
impl<C> BatchRunner for Orchestrator<C>
where
    C: ImageCodec + 'static,
{
    async fn run_batch(&self, screens: &[String]) -> Result<BatchOutcome> {
        self.run_batch_at(screens, Utc::now()).await
    }
}

pub fn orchestrator_error(message: impl Into<String>) -> VqaError {
    VqaError::Orchestrator(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn status(match_score: f64) -> ScreenStatus {
        ScreenStatus::Compared(Box::new(DiffResult {
            mean_diff: 0.0,
            max_diff: 0.0,
            diff_percent: 100.0 - match_score,
            match_score,
            resolution: [1, 1],
            regions: Vec::new(),
            captured_path: PathBuf::new(),
            reference_path: PathBuf::new(),
            captured_hash: String::new(),
            reference_hash: String::new(),
            diff_image: PathBuf::new(),
        }))
    }

    #[test]
    fn summary_excludes_missing_from_bands() {
        let mut screens = BTreeMap::new();
        screens.insert("a".to_string(), status(95.0));
        screens.insert("b".to_string(), status(80.01));
        screens.insert("c".to_string(), status(80.0));
        screens.insert("d".to_string(), ScreenStatus::MissingCaptured);
        screens.insert("e".to_string(), ScreenStatus::MissingReference);
        screens.insert(
            "f".to_string(),
            ScreenStatus::DecodeFailed {
                error: "corrupt".into(),
            },
        );

        let summary = summarize(&screens);
        assert_eq!(
            summary,
            BatchSummary {
                total: 6,
                passing: 1,
                warning: 1,
                failing: 2,
                missing: 2,
            }
        );
    }
}
