use vqa_types::report::DiffRegion;

use crate::{diff::DiffMask, round2};

/// Diff percentage at or below which differences are treated as noise.
pub const REGION_NOISE_FLOOR: f64 = 0.5;

/// Minimal rectangle enclosing every differing pixel of `mask`.
///
/// Only one region is produced per comparison; disjoint clusters end up
/// inside a single box.
pub fn detect_region(mask: &DiffMask, diff_percent: f64) -> Option<DiffRegion> {
    if diff_percent <= REGION_NOISE_FLOOR {
        return None;
    }

    let mut rows = None::<(u32, u32)>;
    let mut cols = None::<(u32, u32)>;
    for (y, row) in (0u32..).zip(mask.rows()) {
        let Some(first) = row.iter().position(|&bit| bit) else {
            continue;
        };
        let last = row.iter().rposition(|&bit| bit).unwrap_or(first);
        let (first, last) = (first as u32, last as u32);

        rows = Some(rows.map_or((y, y), |(start, _)| (start, y)));
        cols = Some(cols.map_or((first, last), |(start, end)| {
            (start.min(first), end.max(last))
        }));
    }

    let ((y_start, y_end), (x_start, x_end)) = (rows?, cols?);
    Some(DiffRegion {
        y_start,
        y_end,
        x_start,
        x_end,
        area_percent: round2(diff_percent),
    })
}
