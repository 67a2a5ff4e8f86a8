//! Navigation behavior: the mobile menu state machine, dropdown handling,
//! anchor smooth scrolling, and the two navbar scroll effects.

use crate::dom::{Dom, NodeId};
use crate::geometry::{LOGO_SHRINK_MIN_WIDTH, Layout};
use crate::runtime::{Effects, EventState};
use crate::Result;

pub(crate) const ACTIVE_CLASS: &str = "active";
pub(crate) const HAS_DROPDOWN_CLASS: &str = "has-dropdown";
pub(crate) const SHRINK_CLASS: &str = "shrink";
pub(crate) const SCROLLED_CLASS: &str = "scrolled";

/// Fraction of the hero's height the page must scroll past before the
/// navbar takes its `scrolled` treatment.
const NAVBAR_SCROLL_TRIGGER_FRACTION: f64 = 0.5;

/// Owns the menu/dropdown state machine.
///
/// All state lives in DOM classes; the controller itself only remembers
/// which nodes participate. At most one dropdown is open at a time: opening
/// one force-closes the rest, and closing the menu closes them all.
#[derive(Debug)]
pub(crate) struct NavController {
    toggle: Option<NodeId>,
    menu: Option<NodeId>,
    navbar: Option<NodeId>,
    links: Vec<NodeId>,
    dropdown_items: Vec<NodeId>,
    anchors: Vec<NodeId>,
}

impl NavController {
    pub(crate) fn from_dom(dom: &Dom) -> Result<Self> {
        Ok(Self {
            toggle: dom.by_id("navToggle"),
            menu: dom.by_id("navMenu"),
            navbar: dom.query_selector(".navbar")?,
            links: dom.query_selector_all(".nav-link")?,
            dropdown_items: dom.query_selector_all(".dropdown-item a")?,
            anchors: dom.query_selector_all("a[href^=\"#\"]")?,
        })
    }

    pub(crate) fn handle_click(
        &self,
        dom: &mut Dom,
        layout: &Layout,
        event: &mut EventState,
        effects: &mut Effects,
    ) -> Result<()> {
        if let (Some(toggle), Some(menu)) = (self.toggle, self.menu) {
            if event.target == toggle || dom.is_descendant_of(event.target, toggle) {
                dom.class_toggle(toggle, ACTIVE_CLASS)?;
                dom.class_toggle(menu, ACTIVE_CLASS)?;
            }
        }

        if let Some(link) = dom.nearest_of(event.target, &self.links) {
            if layout.is_mobile_width() && dom.class_contains(link, HAS_DROPDOWN_CLASS)? {
                event.default_prevented = true;
                self.toggle_dropdown(dom, link)?;
            } else if !dom.class_contains(link, HAS_DROPDOWN_CLASS)? {
                self.close_menu(dom)?;
            }
        }

        if dom.nearest_of(event.target, &self.dropdown_items).is_some() {
            self.close_menu(dom)?;
        }

        if let Some(anchor) = dom.nearest_of(event.target, &self.anchors) {
            self.handle_anchor_click(dom, layout, anchor, event, effects)?;
        }

        Ok(())
    }

    /// The document-level listener: any click landing outside the
    /// navigation container closes the mobile menu. Runs after element
    /// handlers, so a stopped propagation never reaches it.
    pub(crate) fn handle_document_click(
        &self,
        dom: &mut Dom,
        event: &EventState,
    ) -> Result<()> {
        let inside = self.navbar.is_some_and(|navbar| {
            event.target == navbar || dom.is_descendant_of(event.target, navbar)
        });
        if !inside {
            self.close_menu(dom)?;
        }
        Ok(())
    }

    fn toggle_dropdown(&self, dom: &mut Dom, link: NodeId) -> Result<()> {
        dom.class_toggle(link, ACTIVE_CLASS)?;
        if let Some(dropdown) = dom.next_element_sibling(link) {
            dom.class_toggle(dropdown, ACTIVE_CLASS)?;
        }
        if let Some(parent) = dom.parent(link) {
            if dom.element(parent).is_some() {
                dom.class_toggle(parent, ACTIVE_CLASS)?;
            }
        }

        for other in self.links.iter().copied().filter(|other| *other != link) {
            if dom.class_contains(other, HAS_DROPDOWN_CLASS)? {
                self.close_dropdown(dom, other)?;
            }
        }
        Ok(())
    }

    fn close_dropdown(&self, dom: &mut Dom, link: NodeId) -> Result<()> {
        dom.class_remove(link, ACTIVE_CLASS)?;
        if let Some(dropdown) = dom.next_element_sibling(link) {
            dom.class_remove(dropdown, ACTIVE_CLASS)?;
        }
        if let Some(parent) = dom.parent(link) {
            if dom.element(parent).is_some() {
                dom.class_remove(parent, ACTIVE_CLASS)?;
            }
        }
        Ok(())
    }

    pub(crate) fn close_menu(&self, dom: &mut Dom) -> Result<()> {
        if let Some(toggle) = self.toggle {
            dom.class_remove(toggle, ACTIVE_CLASS)?;
        }
        if let Some(menu) = self.menu {
            dom.class_remove(menu, ACTIVE_CLASS)?;
        }
        for link in self.links.iter().copied() {
            if dom.class_contains(link, HAS_DROPDOWN_CLASS)? {
                self.close_dropdown(dom, link)?;
            }
        }
        Ok(())
    }

    fn handle_anchor_click(
        &self,
        dom: &Dom,
        layout: &Layout,
        anchor: NodeId,
        event: &mut EventState,
        effects: &mut Effects,
    ) -> Result<()> {
        let Some(href) = dom.attr(anchor, "href") else {
            return Ok(());
        };
        if href == "#" {
            return Ok(());
        }
        let Some(target) = href.strip_prefix('#').and_then(|id| dom.by_id(id)) else {
            return Ok(());
        };

        event.default_prevented = true;
        let navbar_height = self
            .navbar
            .map(|navbar| layout.offset_height(navbar))
            .unwrap_or(0.0);
        let target_position = layout.offset_top(target) - navbar_height;
        effects.trace(format!("[nav] smooth_scroll target={target_position}"));
        effects.smooth_scroll(target_position);
        Ok(())
    }
}

/// Shrinks the logo once the page scrolls past the hero, desktop only.
#[derive(Debug)]
pub(crate) struct LogoShrink {
    hero: NodeId,
    navbar: NodeId,
    logo: NodeId,
}

impl LogoShrink {
    /// All three collaborators are required; otherwise the effect stays off.
    pub(crate) fn from_dom(dom: &Dom) -> Result<Option<Self>> {
        let (Some(hero), Some(navbar), Some(logo)) = (
            dom.by_id("hero"),
            dom.query_selector(".navbar")?,
            dom.query_selector(".nav-logo")?,
        ) else {
            return Ok(None);
        };
        Ok(Some(Self { hero, navbar, logo }))
    }

    pub(crate) fn handle_scroll(&self, dom: &mut Dom, layout: &Layout) -> Result<()> {
        if layout.viewport_width >= LOGO_SHRINK_MIN_WIDTH {
            let trigger = layout.offset_height(self.hero) - layout.offset_height(self.navbar);
            if layout.scroll_y > trigger {
                dom.class_add(self.logo, SHRINK_CLASS)?;
            } else {
                dom.class_remove(self.logo, SHRINK_CLASS)?;
            }
        } else {
            // Reset when resizing back below the desktop tier.
            dom.class_remove(self.logo, SHRINK_CLASS)?;
        }
        Ok(())
    }
}

/// Applies the navbar's `scrolled` treatment past half the hero's height.
#[derive(Debug)]
pub(crate) struct NavbarScrollFx {
    navbar: NodeId,
    hero: NodeId,
}

impl NavbarScrollFx {
    pub(crate) fn from_dom(dom: &Dom) -> Result<Option<Self>> {
        let (Some(navbar), Some(hero)) = (dom.query_selector(".navbar")?, dom.by_id("hero"))
        else {
            return Ok(None);
        };
        Ok(Some(Self { navbar, hero }))
    }

    pub(crate) fn handle_scroll(&self, dom: &mut Dom, layout: &Layout) -> Result<()> {
        let trigger_point = layout.offset_height(self.hero) * NAVBAR_SCROLL_TRIGGER_FRACTION;
        if layout.scroll_y > trigger_point {
            dom.class_add(self.navbar, SCROLLED_CLASS)?;
        } else {
            dom.class_remove(self.navbar, SCROLLED_CLASS)?;
        }
        Ok(())
    }
}
