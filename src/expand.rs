//! Scroll-driven media expand effect: the background layer scales from 10%
//! to full size as its section travels through the viewport, and an
//! overlay panel rises from the bottom over the second half of that travel.

use crate::dom::{Dom, NodeId};
use crate::geometry::Layout;
use crate::progress::{
    expand_scale, format_style_number, overlay_height_percent, section_progress,
};
use crate::runtime::Effects;
use crate::Result;

#[derive(Debug)]
pub(crate) struct ExpandController {
    section: NodeId,
    background: NodeId,
    overlay: Option<NodeId>,
    media: NodeId,
    /// Section opt-in: only drive the overlay height at desktop widths.
    overlay_desktop_only: bool,
    playing: bool,
}

impl ExpandController {
    /// Section, background layer, and media element are required; the
    /// overlay is optional. Missing pieces leave the effect inactive.
    pub(crate) fn from_dom(dom: &Dom) -> Option<Self> {
        let section = dom.by_id("mediaExpand")?;
        let background = dom.by_id("mediaExpandBg")?;
        let media = dom.by_id("mediaExpandVideo")?;
        let overlay = dom.by_id("mediaExpandOverlay");
        let overlay_desktop_only = dom.attr(section, "data-overlay-desktop-only").is_some();
        Some(Self {
            section,
            background,
            overlay,
            media,
            overlay_desktop_only,
            playing: false,
        })
    }

    /// Init-time media setup: force muted, then attempt playback. A refused
    /// autoplay is logged and swallowed; playback is never retried.
    pub(crate) fn start_media(
        &mut self,
        dom: &mut Dom,
        autoplay_allowed: bool,
        effects: &mut Effects,
    ) -> Result<()> {
        dom.set_attr(self.media, "muted", "true")?;
        if autoplay_allowed {
            self.playing = true;
        } else {
            effects.trace("[media] autoplay rejected".to_string());
        }
        Ok(())
    }

    pub(crate) fn is_media_playing(&self) -> bool {
        self.playing
    }

    /// Recompute and apply both style outputs from current geometry.
    pub(crate) fn update(&self, dom: &mut Dom, layout: &Layout) -> Result<()> {
        let rect = layout.client_rect(self.section);
        let progress = section_progress(rect, layout.viewport_height);

        let scale = expand_scale(progress);
        dom.style_set(
            self.background,
            "transform",
            &format!("scale({})", format_style_number(scale)),
        )?;

        if let Some(overlay) = self.overlay {
            if self.overlay_desktop_only && !layout.is_desktop_width() {
                return Ok(());
            }
            let height = overlay_height_percent(progress);
            dom.style_set(
                overlay,
                "height",
                &format!("{}%", format_style_number(height)),
            )?;
        }
        Ok(())
    }
}
