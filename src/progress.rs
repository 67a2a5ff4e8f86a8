//! Scroll progress and its style projections.
//!
//! A tracked section's travel through the viewport reduces to one scalar in
//! [0, 1]; the expand effect derives its background scale and overlay height
//! from that scalar alone. Everything here is a pure function of geometry,
//! recomputed from scratch on every scroll event.

use crate::geometry::Rect;

/// Background scale at progress 0 (10% of full size).
pub const EXPAND_MIN_SCALE: f64 = 0.1;
/// Background scale at progress 1.
pub const EXPAND_MAX_SCALE: f64 = 1.0;
/// Progress at which the overlay panel starts rising.
pub const OVERLAY_START_PROGRESS: f64 = 0.5;
/// Overlay height (percent) at progress 1.
pub const OVERLAY_MAX_HEIGHT_PCT: f64 = 30.0;

/// How far a section has scrolled through the viewport.
///
/// - Intersecting (top above the viewport bottom, bottom below the viewport
///   top): the scrolled-into distance over the section height, clamped.
/// - Fully passed (bottom at or above the viewport top): 1.
/// - Not yet reached: 0.
///
/// `rect` is viewport-relative. Monotonically non-decreasing as the section
/// scrolls upward past the viewport, by construction of the inputs.
pub fn section_progress(rect: Rect, viewport_height: f64) -> f64 {
    if rect.top < viewport_height && rect.bottom() > 0.0 {
        if rect.height <= 0.0 {
            return 0.0;
        }
        let scrolled_into_section = viewport_height - rect.top;
        (scrolled_into_section / rect.height).clamp(0.0, 1.0)
    } else if rect.bottom() <= 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Linear scale ramp: 0.1 at progress 0 up to 1.0 at progress 1.
pub fn expand_scale(progress: f64) -> f64 {
    EXPAND_MIN_SCALE + progress * (EXPAND_MAX_SCALE - EXPAND_MIN_SCALE)
}

/// Overlay height in percent: flat 0 until half progress, then a linear
/// rise to exactly 30 at full progress.
pub fn overlay_height_percent(progress: f64) -> f64 {
    if progress < OVERLAY_START_PROGRESS {
        return 0.0;
    }
    let overlay_progress =
        (progress - OVERLAY_START_PROGRESS) / (1.0 - OVERLAY_START_PROGRESS);
    overlay_progress * OVERLAY_MAX_HEIGHT_PCT
}

/// Format a float the way an inline style expects: rounded to four decimal
/// places so accumulated float error never leaks into style strings, with
/// no trailing `.0` on whole numbers.
pub(crate) fn format_style_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == rounded.trunc() && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}
