//! Human-readable rendering of a batch report.

use std::{fmt::Write, path::Path};

use vqa_types::report::{BatchReport, ScreenStatus};
use vqa_vision::classify;

const PLACEHOLDER: &str = "—";
const MISSING_GLYPH: &str = "⚠️";

pub fn render_markdown(report: &BatchReport, reports_dir: &Path) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "# Visual QA Report");
    let _ = writeln!(out, "**Generated:** {}", report.timestamp.to_rfc3339());
    let _ = writeln!(
        out,
        "**Screens:** {} total | ✅ {} passing | 🟡 {} warning | 🔴 {} failing | {MISSING_GLYPH} {} missing",
        summary.total, summary.passing, summary.warning, summary.failing, summary.missing
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Results");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Screen | Match | Diff % | Status |");
    let _ = writeln!(out, "|--------|-------|--------|--------|");

    for (name, status) in &report.screens {
        match status {
            ScreenStatus::Compared(result) => {
                let glyph = classify(result.match_score).glyph();
                let _ = writeln!(
                    out,
                    "| {name} | {:.2}% | {:.2}% | {glyph} |",
                    result.match_score, result.diff_percent
                );
            }
            other => {
                let label = other.status_label().unwrap_or_default();
                let _ = writeln!(
                    out,
                    "| {name} | {PLACEHOLDER} | {PLACEHOLDER} | {MISSING_GLYPH} {label} |"
                );
            }
        }
    }

    let diff_glob = reports_dir.join("diff_*.png");
    let _ = writeln!(out);
    let _ = writeln!(out, "## How to Fix");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "1. Open diff images in `{}` to see highlighted differences",
        diff_glob.display()
    );
    let _ = writeln!(
        out,
        "2. Compare the captured screenshot and the design export side by side for flagged regions"
    );
    let _ = writeln!(out, "3. Fix the UI in the game build");
    let _ = writeln!(out, "4. Recapture screenshots for the affected screens");
    let _ = write!(out, "5. Re-run `vqa-cli compare` to verify");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use vqa_types::report::{BatchSummary, DiffResult};

    fn compared(match_score: f64) -> ScreenStatus {
        ScreenStatus::Compared(Box::new(DiffResult {
            mean_diff: 0.0,
            max_diff: 0.0,
            diff_percent: 100.0 - match_score,
            match_score,
            resolution: [10, 10],
            regions: Vec::new(),
            captured_path: "unity/x.png".into(),
            reference_path: "figma/x.png".into(),
            captured_hash: String::new(),
            reference_hash: String::new(),
            diff_image: "reports/diff_x.png".into(),
        }))
    }

    #[test]
    fn renders_rows_and_placeholders() {
        let mut screens = BTreeMap::new();
        screens.insert("Alpha".to_string(), compared(100.0));
        screens.insert("Beta".to_string(), compared(90.0));
        screens.insert("Gamma".to_string(), ScreenStatus::MissingCaptured);
        let report = BatchReport {
            timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            screens,
            summary: BatchSummary {
                total: 3,
                passing: 1,
                warning: 1,
                failing: 0,
                missing: 1,
            },
        };

        let md = render_markdown(&report, Path::new("QA/Reports"));
        assert!(md.starts_with("# Visual QA Report\n**Generated:** 2026-01-02T03:04:05+00:00\n"));
        assert!(md.contains("3 total | ✅ 1 passing | 🟡 1 warning | 🔴 0 failing | ⚠️ 1 missing"));
        assert!(md.contains("| Alpha | 100.00% | 0.00% | ✅ |"));
        assert!(md.contains("| Beta | 90.00% | 10.00% | 🟡 |"));
        assert!(md.contains("| Gamma | — | — | ⚠️ missing_captured |"));
        assert!(md.contains("`QA/Reports/diff_*.png`"));
    }
}
