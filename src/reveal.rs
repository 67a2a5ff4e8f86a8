//! Scroll-triggered reveal animations.
//!
//! Two watchers over disjoint element sets, mirroring a pair of
//! intersection observers: a one-shot watcher that reveals an element the
//! first time it intersects and never looks at it again, and a repeating
//! watcher that reveals on entry and resets on full exit. Membership is
//! collected once at initialization and never changes.

use crate::dom::{Dom, NodeId};
use crate::geometry::Layout;
use crate::runtime::{Effects, TimerJob};
use crate::Result;

pub(crate) const VISIBLE_CLASS: &str = "visible";

/// Classes carrying an animation delay. Matched by substring, so both
/// `delay-200` and `md-delay-200` count.
pub(crate) const DELAY_CLASS_MARKER: &str = "delay-";

/// How long stripped `delay-*` classes stay off after a repeating element
/// fully exits, so the next entrance restarts its delay from zero.
pub const DELAY_RESTORE_MS: i64 = 50;

/// Delay before the post-init pass that reveals elements already in view.
pub const CATCH_UP_DELAY_MS: i64 = 100;

/// One-shot watcher: reveal once at least this fraction is visible.
const ONE_SHOT_THRESHOLD: f64 = 0.1;
/// One-shot watcher shrinks the viewport bottom by this fraction.
const ONE_SHOT_BOTTOM_MARGIN: f64 = 0.10;
/// Repeating watcher uses a smaller shrink for earlier exit detection.
const REPEATING_BOTTOM_MARGIN: f64 = 0.05;

const ONE_SHOT_SELECTOR: &str = ".animate, .md-animate, .lg-animate, .xl-animate";
const REPEATING_SELECTOR: &str =
    ".animate-repeat, .md-animate-repeat, .lg-animate-repeat, .xl-animate-repeat";

#[derive(Debug)]
struct WatchedElement {
    node: NodeId,
    was_intersecting: bool,
    /// One-shot only: revealed and no longer watched.
    done: bool,
}

#[derive(Debug)]
pub(crate) struct RevealController {
    one_shot: Vec<WatchedElement>,
    repeating: Vec<WatchedElement>,
}

impl RevealController {
    pub(crate) fn from_dom(dom: &Dom) -> Result<Self> {
        let watch = |nodes: Vec<NodeId>| {
            nodes
                .into_iter()
                .map(|node| WatchedElement {
                    node,
                    was_intersecting: false,
                    done: false,
                })
                .collect::<Vec<_>>()
        };
        Ok(Self {
            one_shot: watch(dom.query_selector_all(ONE_SHOT_SELECTOR)?),
            repeating: watch(dom.query_selector_all(REPEATING_SELECTOR)?),
        })
    }

    /// Re-derive intersection state for every watched element. Runs on each
    /// scroll and resize event; only transitions have effects.
    pub(crate) fn evaluate(
        &mut self,
        dom: &mut Dom,
        layout: &Layout,
        delay_restore_ms: i64,
        effects: &mut Effects,
    ) -> Result<()> {
        for watched in self.one_shot.iter_mut().filter(|watched| !watched.done) {
            let ratio = layout.intersection_ratio(watched.node, ONE_SHOT_BOTTOM_MARGIN);
            if ratio >= ONE_SHOT_THRESHOLD {
                dom.class_add(watched.node, VISIBLE_CLASS)?;
                watched.done = true;
            }
        }

        for watched in self.repeating.iter_mut() {
            let ratio = layout.intersection_ratio(watched.node, REPEATING_BOTTOM_MARGIN);
            let is_intersecting = ratio > 0.0;

            if is_intersecting {
                dom.class_add(watched.node, VISIBLE_CLASS)?;
            } else if watched.was_intersecting {
                // Full exit: drop the element's delay classes so the next
                // entrance restarts its delay, remove the reveal class
                // synchronously, and put the delay classes back after the
                // restore window.
                let delay_classes: Vec<String> = dom
                    .class_names(watched.node)?
                    .into_iter()
                    .filter(|name| name.contains(DELAY_CLASS_MARKER))
                    .collect();
                for class in &delay_classes {
                    dom.class_remove(watched.node, class)?;
                }
                dom.class_remove(watched.node, VISIBLE_CLASS)?;
                if !delay_classes.is_empty() {
                    effects.schedule(
                        delay_restore_ms,
                        TimerJob::RestoreDelayClasses {
                            node: watched.node,
                            classes: delay_classes,
                        },
                    );
                }
            }

            watched.was_intersecting = is_intersecting;
        }

        Ok(())
    }

    /// The post-init pass: anything already fully inside the viewport is
    /// revealed immediately, covering elements visible without scrolling.
    pub(crate) fn catch_up(&mut self, dom: &mut Dom, layout: &Layout) -> Result<()> {
        for watched in self.one_shot.iter().chain(self.repeating.iter()) {
            if layout.fully_within_viewport(watched.node) {
                dom.class_add(watched.node, VISIBLE_CLASS)?;
            }
        }
        Ok(())
    }

    pub(crate) fn restore_delay_classes(
        dom: &mut Dom,
        node: NodeId,
        classes: &[String],
    ) -> Result<()> {
        for class in classes {
            dom.class_add(node, class)?;
        }
        Ok(())
    }
}
