use vqa_types::report::MatchClass;

use crate::round2;

/// Scores at or above this pass.
pub const PASS_THRESHOLD: f64 = 95.0;
/// Scores strictly above this (and not passing) warn; the rest fail.
pub const WARN_THRESHOLD: f64 = 80.0;

pub fn match_score(diff_percent: f64) -> f64 {
    round2(100.0 - diff_percent)
}

pub fn classify(match_score: f64) -> MatchClass {
    if match_score >= PASS_THRESHOLD {
        MatchClass::Passing
    } else if match_score > WARN_THRESHOLD {
        MatchClass::Warning
    } else {
        MatchClass::Failing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_complements_diff_percent() {
        assert_eq!(match_score(0.0), 100.0);
        assert_eq!(match_score(12.25), 87.75);
        for diff in [0.0, 0.004, 3.333_333, 49.999, 100.0] {
            assert!((match_score(diff) + round2(diff) - 100.0).abs() <= 0.01);
        }
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(classify(100.0), MatchClass::Passing);
        assert_eq!(classify(95.01), MatchClass::Passing);
        assert_eq!(classify(95.0), MatchClass::Passing);
        assert_eq!(classify(95.0 - 1e-9), MatchClass::Warning);
        assert_eq!(classify(80.0 + 1e-9), MatchClass::Warning);
        assert_eq!(classify(80.0), MatchClass::Failing);
        assert_eq!(classify(0.0), MatchClass::Failing);
    }
}
