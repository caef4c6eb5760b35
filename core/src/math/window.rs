use crate::prelude::{AnalysisError, AnalysisResult};
use std::slice::{ChunksExact, Windows};

/// Fully overlapping windows: stride 1, one window per point from `span - 1` on.
pub fn rolling<T>(values: &[T], span: usize) -> AnalysisResult<Windows<'_, T>> {
    check_span(span)?;
    Ok(values.windows(span))
}

/// Non-overlapping windows with stride equal to `span`; a short tail is dropped.
pub fn groups<T>(values: &[T], span: usize) -> AnalysisResult<ChunksExact<'_, T>> {
    check_span(span)?;
    Ok(values.chunks_exact(span))
}

/// Clamps `[start, end)` to `0..len`, producing a possibly empty range.
pub fn clipped(start: isize, end: isize, len: usize) -> std::ops::Range<usize> {
    let clamp = |bound: isize| bound.clamp(0, len as isize) as usize;
    let (lo, hi) = (clamp(start), clamp(end));
    lo..hi.max(lo)
}

fn check_span(span: usize) -> AnalysisResult<()> {
    if span == 0 {
        return Err(AnalysisError::InvalidParameter(
            "window span must be positive".into(),
        ));
    }
    Ok(())
}
