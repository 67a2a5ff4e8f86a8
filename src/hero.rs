//! Hero scroll indicator: click to scroll to the next section, fade out
//! once the user starts scrolling.

use crate::dom::{Dom, NodeId};
use crate::geometry::Layout;
use crate::runtime::{Effects, EventState};
use crate::Result;

/// Scroll offset past which the indicator fades out.
const HINT_FADE_SCROLL_Y: f64 = 100.0;

#[derive(Debug)]
pub(crate) struct HeroIndicator {
    indicator: NodeId,
    target: NodeId,
}

impl HeroIndicator {
    /// Both the indicator and its target section are required; without
    /// either the feature simply does not activate.
    pub(crate) fn from_dom(dom: &Dom) -> Option<Self> {
        let indicator = dom.by_id("scrollHint")?;
        let target = dom.by_id("mediaExpand")?;
        Some(Self { indicator, target })
    }

    pub(crate) fn handle_click(
        &self,
        dom: &Dom,
        layout: &Layout,
        event: &EventState,
        effects: &mut Effects,
    ) {
        if event.target == self.indicator || dom.is_descendant_of(event.target, self.indicator) {
            let target_position = layout.offset_top(self.target);
            effects.trace(format!("[hero] scroll_into_view target={target_position}"));
            effects.smooth_scroll(target_position);
        }
    }

    pub(crate) fn handle_scroll(&self, dom: &mut Dom, layout: &Layout) -> Result<()> {
        if layout.scroll_y > HINT_FADE_SCROLL_Y {
            dom.style_set(self.indicator, "opacity", "0")?;
            dom.style_set(self.indicator, "pointer-events", "none")?;
        } else {
            dom.style_set(self.indicator, "opacity", "1")?;
            dom.style_set(self.indicator, "pointer-events", "auto")?;
        }
        Ok(())
    }
}
