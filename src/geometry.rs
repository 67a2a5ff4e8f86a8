use std::collections::HashMap;

use crate::dom::NodeId;

/// Widths at or below this are the mobile tier (dropdowns toggle in place,
/// detail panels expand on tap).
pub const MOBILE_MAX_WIDTH: f64 = 768.0;
/// Widths at or above this are the desktop tier.
pub const DESKTOP_MIN_WIDTH: f64 = 769.0;
/// The logo shrink effect only engages from this width up.
pub const LOGO_SHRINK_MIN_WIDTH: f64 = 1024.0;

/// Axis-aligned box in document coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// The geometry provider: viewport size, scroll offsets, and a per-element
/// document-rect table. Elements never laid out read as the zero rect, the
/// same way the offset getters of a detached element read as zero.
///
/// Nothing here queries a rendering engine; rects come from fixture markup
/// (`data-rect` attributes) or from explicit harness calls, which is what
/// makes every geometry-dependent behavior reproducible in tests.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub(crate) viewport_width: f64,
    pub(crate) viewport_height: f64,
    pub(crate) scroll_x: f64,
    pub(crate) scroll_y: f64,
    rects: HashMap<NodeId, Rect>,
}

pub(crate) const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub(crate) const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

impl Default for Layout {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_x: 0.0,
            scroll_y: 0.0,
            rects: HashMap::new(),
        }
    }
}

impl Layout {
    pub(crate) fn set_rect(&mut self, node_id: NodeId, rect: Rect) {
        self.rects.insert(node_id, rect);
    }

    /// Document-space rect (independent of scrolling).
    pub(crate) fn document_rect(&self, node_id: NodeId) -> Rect {
        self.rects.get(&node_id).copied().unwrap_or_default()
    }

    /// Viewport-relative rect, the `getBoundingClientRect` analog.
    pub(crate) fn client_rect(&self, node_id: NodeId) -> Rect {
        let rect = self.document_rect(node_id);
        Rect {
            top: rect.top - self.scroll_y,
            left: rect.left - self.scroll_x,
            ..rect
        }
    }

    pub(crate) fn offset_top(&self, node_id: NodeId) -> f64 {
        self.document_rect(node_id).top
    }

    pub(crate) fn offset_height(&self, node_id: NodeId) -> f64 {
        self.document_rect(node_id).height
    }

    /// Whole element inside the viewport, edges inclusive.
    pub(crate) fn fully_within_viewport(&self, node_id: NodeId) -> bool {
        let rect = self.client_rect(node_id);
        rect.top >= 0.0
            && rect.left >= 0.0
            && rect.bottom() <= self.viewport_height
            && rect.right() <= self.viewport_width
    }

    pub(crate) fn is_mobile_width(&self) -> bool {
        self.viewport_width <= MOBILE_MAX_WIDTH
    }

    pub(crate) fn is_desktop_width(&self) -> bool {
        self.viewport_width >= DESKTOP_MIN_WIDTH
    }

    /// Fraction of the element's area inside the viewport after shrinking
    /// the viewport's bottom edge by `bottom_margin_pct` of its height (the
    /// `rootMargin: '0 0 -N% 0'` analog). Zero-area elements read as 0.
    pub(crate) fn intersection_ratio(&self, node_id: NodeId, bottom_margin_pct: f64) -> f64 {
        let rect = self.client_rect(node_id);
        let area = rect.width * rect.height;
        if area <= 0.0 {
            return 0.0;
        }

        let root_bottom = self.viewport_height * (1.0 - bottom_margin_pct);
        let overlap_w = rect.right().min(self.viewport_width) - rect.left.max(0.0);
        let overlap_h = rect.bottom().min(root_bottom) - rect.top.max(0.0);
        if overlap_w <= 0.0 || overlap_h <= 0.0 {
            return 0.0;
        }
        (overlap_w * overlap_h / area).clamp(0.0, 1.0)
    }
}

/// Parse a `data-rect="top left width height"` attribute value.
pub(crate) fn parse_rect_attr(raw: &str) -> Option<Rect> {
    let mut parts = raw.split_ascii_whitespace().map(str::parse::<f64>);
    let top = parts.next()?.ok()?;
    let left = parts.next()?.ok()?;
    let width = parts.next()?.ok()?;
    let height = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rect::new(top, left, width, height))
}

/// Parse a `data-viewport="width height"` attribute value.
pub(crate) fn parse_viewport_attr(raw: &str) -> Option<(f64, f64)> {
    let mut parts = raw.split_ascii_whitespace().map(str::parse::<f64>);
    let width = parts.next()?.ok()?;
    let height = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((width, height))
}
