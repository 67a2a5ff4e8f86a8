//! Image slider: a cyclic, index-addressed set of slides with synchronized
//! dots, thumbnails, previous/next controls, a background layer, and
//! per-slide detail panels that expand on tap at mobile widths.

use crate::dom::{Dom, NodeId};
use crate::geometry::Layout;
use crate::runtime::EventState;
use crate::{Error, Result};

pub(crate) const ACTIVE_CLASS: &str = "active";
pub(crate) const EXPANDED_CLASS: &str = "expanded";

/// Owns the slide index; every mutation goes through [`show_slide`].
///
/// The index always stays in `[0, count)`: the cyclic operations wrap
/// modulo the slide count, and dot/thumbnail positions are checked against
/// it, so a control can only ever address an existing slide.
///
/// [`show_slide`]: CarouselController::show_slide
#[derive(Debug)]
pub(crate) struct CarouselController {
    slides: Vec<NodeId>,
    dots: Vec<NodeId>,
    thumbnails: Vec<NodeId>,
    prev_control: Option<NodeId>,
    next_control: Option<NodeId>,
    detail_arrows: Vec<(NodeId, usize)>,
    background: Option<NodeId>,
    overlay: Option<NodeId>,
    /// One background image per slide, collected from `data-background`.
    images: Vec<String>,
    current: usize,
}

impl CarouselController {
    /// Builds the controller from the first `.slider` region, or `None`
    /// when the page has no carousel. Every slide must carry a
    /// `data-background` attribute; the one-image-per-slide precondition is
    /// checked here instead of surfacing later as an out-of-range lookup.
    pub(crate) fn from_dom(dom: &mut Dom, layout: &Layout) -> Result<Option<Self>> {
        let Some(region) = dom.query_selector(".slider")? else {
            return Ok(None);
        };

        let slides = dom.query_selector_all_from(region, ".slide")?;
        if slides.is_empty() {
            return Ok(None);
        }

        let mut images = Vec::with_capacity(slides.len());
        for (index, slide) in slides.iter().enumerate() {
            let Some(image) = dom.attr(*slide, "data-background") else {
                return Err(Error::SlideBackgroundMissing { slide: index });
            };
            images.push(image);
        }

        let mut detail_arrows = Vec::new();
        for arrow in dom.query_selector_all_from(region, ".detail-arrow")? {
            let Some(slide) = dom.nearest_of(arrow, &slides) else {
                continue;
            };
            let index = slides
                .iter()
                .position(|candidate| *candidate == slide)
                .unwrap_or(0);
            detail_arrows.push((arrow, index));
        }

        let mut carousel = Self {
            dots: dom.query_selector_all_from(region, ".slider-dot")?,
            thumbnails: dom.query_selector_all_from(region, ".slider-thumb")?,
            prev_control: dom.query_selector_all_from(region, ".slider-prev")?.first().copied(),
            next_control: dom.query_selector_all_from(region, ".slider-next")?.first().copied(),
            background: dom.query_selector_all_from(region, ".slider-bg")?.first().copied(),
            overlay: dom.query_selector_all_from(region, ".slider-overlay")?.first().copied(),
            slides,
            detail_arrows,
            images,
            current: 0,
        };

        carousel.show_slide(dom, layout, 0)?;
        Ok(Some(carousel))
    }

    pub(crate) fn active_index(&self) -> usize {
        self.current
    }

    pub(crate) fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Activate the slide at `index` and re-render every synchronized
    /// control. `index` must be in range; the cyclic operations and the
    /// construction-time control pairing guarantee that for internal calls.
    pub(crate) fn show_slide(&mut self, dom: &mut Dom, layout: &Layout, index: usize) -> Result<()> {
        for slide in &self.slides {
            dom.class_remove(*slide, ACTIVE_CLASS)?;
        }
        for dot in &self.dots {
            dom.class_remove(*dot, ACTIVE_CLASS)?;
        }
        for thumbnail in &self.thumbnails {
            dom.class_remove(*thumbnail, ACTIVE_CLASS)?;
        }

        dom.class_add(self.slides[index], ACTIVE_CLASS)?;
        if let Some(dot) = self.dots.get(index) {
            dom.class_add(*dot, ACTIVE_CLASS)?;
        }
        if let Some(thumbnail) = self.thumbnails.get(index) {
            dom.class_add(*thumbnail, ACTIVE_CLASS)?;
        }

        if let Some(background) = self.background {
            dom.style_set(
                background,
                "background-image",
                &format!("url({})", self.images[index]),
            )?;
        }

        if !layout.is_desktop_width() {
            self.collapse_detail_panels(dom)?;
        }

        self.current = index;
        Ok(())
    }

    pub(crate) fn next(&mut self, dom: &mut Dom, layout: &Layout) -> Result<()> {
        let index = (self.current + 1) % self.slides.len();
        self.show_slide(dom, layout, index)
    }

    pub(crate) fn prev(&mut self, dom: &mut Dom, layout: &Layout) -> Result<()> {
        let index = (self.current + self.slides.len() - 1) % self.slides.len();
        self.show_slide(dom, layout, index)
    }

    pub(crate) fn handle_click(
        &mut self,
        dom: &mut Dom,
        layout: &Layout,
        event: &mut EventState,
    ) -> Result<()> {
        let arrows: Vec<NodeId> = self.detail_arrows.iter().map(|(arrow, _)| *arrow).collect();
        if let Some(arrow) = dom.nearest_of(event.target, &arrows) {
            if !layout.is_desktop_width() {
                let index = self
                    .detail_arrows
                    .iter()
                    .find(|(candidate, _)| *candidate == arrow)
                    .map(|(_, index)| *index)
                    .unwrap_or(0);
                self.toggle_detail_panel(dom, index)?;
                // The arrow sits inside the slide; without this the same
                // tap would also fire slide navigation.
                event.propagation_stopped = true;
            }
            return Ok(());
        }

        if let Some(dot) = dom.nearest_of(event.target, &self.dots) {
            let index = self.dots.iter().position(|candidate| *candidate == dot);
            if let Some(index) = index.filter(|index| *index < self.slides.len()) {
                self.show_slide(dom, layout, index)?;
            }
            return Ok(());
        }

        if let Some(thumbnail) = dom.nearest_of(event.target, &self.thumbnails) {
            let index = self
                .thumbnails
                .iter()
                .position(|candidate| *candidate == thumbnail);
            if let Some(index) = index.filter(|index| *index < self.slides.len()) {
                self.show_slide(dom, layout, index)?;
            }
            return Ok(());
        }

        if let Some(prev) = self.prev_control {
            if event.target == prev || dom.is_descendant_of(event.target, prev) {
                return self.prev(dom, layout);
            }
        }
        if let Some(next) = self.next_control {
            if event.target == next || dom.is_descendant_of(event.target, next) {
                return self.next(dom, layout);
            }
        }
        Ok(())
    }

    fn toggle_detail_panel(&self, dom: &mut Dom, index: usize) -> Result<()> {
        let expanded = dom.class_toggle(self.slides[index], EXPANDED_CLASS)?;
        if let Some(overlay) = self.overlay {
            if expanded {
                dom.class_add(overlay, EXPANDED_CLASS)?;
            } else {
                dom.class_remove(overlay, EXPANDED_CLASS)?;
            }
        }
        Ok(())
    }

    fn collapse_detail_panels(&self, dom: &mut Dom) -> Result<()> {
        for slide in &self.slides {
            dom.class_remove(*slide, EXPANDED_CLASS)?;
        }
        if let Some(overlay) = self.overlay {
            dom.class_remove(overlay, EXPANDED_CLASS)?;
        }
        Ok(())
    }
}
