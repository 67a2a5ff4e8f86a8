use std::error::Error as StdError;
use std::fmt;

mod carousel;
mod dom;
mod expand;
mod geometry;
mod hero;
mod html;
mod nav;
mod progress;
mod reveal;
mod runtime;
mod selector;

#[cfg(test)]
mod tests;

pub use geometry::{
    DESKTOP_MIN_WIDTH, LOGO_SHRINK_MIN_WIDTH, MOBILE_MAX_WIDTH, Rect,
};
pub use progress::{
    EXPAND_MAX_SCALE, EXPAND_MIN_SCALE, OVERLAY_MAX_HEIGHT_PCT, OVERLAY_START_PROGRESS,
    expand_scale, overlay_height_percent, section_progress,
};
pub use reveal::{CATCH_UP_DELAY_MS, DELAY_RESTORE_MS};
pub use runtime::{PendingTimer, ScrollRequest};

use carousel::CarouselController;
use dom::{Dom, NodeId};
use expand::ExpandController;
use geometry::{Layout, parse_rect_attr, parse_viewport_attr};
use hero::HeroIndicator;
use nav::{LogoShrink, NavController, NavbarScrollFx};
use reveal::RevealController;
use runtime::{Effects, EventState, ScheduledTask, TimerJob};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    NotAnElement(String),
    SlideBackgroundMissing {
        slide: usize,
    },
    SlideIndexOutOfRange {
        index: usize,
        count: usize,
    },
    NoCarousel,
    InvalidConfig(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::NotAnElement(context) => write!(f, "{context} is not an element"),
            Self::SlideBackgroundMissing { slide } => {
                write!(f, "slide {slide} has no data-background image")
            }
            Self::SlideIndexOutOfRange { index, count } => {
                write!(f, "slide index {index} out of range for {count} slides")
            }
            Self::NoCarousel => write!(f, "document has no carousel region"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

/// A loaded page with its interaction behavior attached.
///
/// `Page` plays the part the browser plays for the real site: it owns the
/// DOM, the layout geometry, a virtual clock, and the behavior controllers,
/// and exposes the input surface (`click`, `scroll_to`, `resize`,
/// `advance_time`) plus query/assert helpers for tests.
///
/// Behaviors initialize from the parsed document exactly once, in the order
/// the page would wire them on load: navigation, logo shrink, navbar scroll
/// effect, reveal animations, hero indicator, media expand, carousel. A
/// behavior whose required elements are absent simply stays inert.
#[derive(Debug)]
pub struct Page {
    dom: Dom,
    layout: Layout,
    task_queue: Vec<ScheduledTask>,
    now_ms: i64,
    next_timer_id: i64,
    next_task_order: i64,
    delay_restore_ms: i64,
    navigations: Vec<String>,
    scroll_requests: Vec<ScrollRequest>,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
    nav: NavController,
    logo_shrink: Option<LogoShrink>,
    navbar_fx: Option<NavbarScrollFx>,
    reveal: RevealController,
    hero: Option<HeroIndicator>,
    expand: Option<ExpandController>,
    carousel: Option<CarouselController>,
}

impl Page {
    /// Parse a fixture and initialize every behavior present in it.
    ///
    /// Geometry comes from the fixture too: `data-rect="top left width
    /// height"` on any element sets its document rect, and
    /// `data-viewport="width height"` on any element sizes the viewport
    /// (default 1280 × 800). A media element carrying `data-autoplay="blocked"`
    /// simulates an autoplay rejection.
    pub fn from_html(html: &str) -> Result<Self> {
        let mut dom = html::parse_html(html)?;
        let mut layout = Layout::default();
        let mut autoplay_allowed = true;

        for node in (0..dom.nodes.len()).map(NodeId) {
            if let Some(raw) = dom.attr(node, "data-rect") {
                let rect = parse_rect_attr(&raw).ok_or_else(|| {
                    Error::InvalidConfig(format!("bad data-rect value: {raw}"))
                })?;
                layout.set_rect(node, rect);
            }
            if let Some(raw) = dom.attr(node, "data-viewport") {
                let (width, height) = parse_viewport_attr(&raw).ok_or_else(|| {
                    Error::InvalidConfig(format!("bad data-viewport value: {raw}"))
                })?;
                layout.viewport_width = width;
                layout.viewport_height = height;
            }
            if dom.attr(node, "data-autoplay").as_deref() == Some("blocked") {
                autoplay_allowed = false;
            }
        }

        let nav = NavController::from_dom(&dom)?;
        let logo_shrink = LogoShrink::from_dom(&dom)?;
        let navbar_fx = NavbarScrollFx::from_dom(&dom)?;
        let reveal = RevealController::from_dom(&dom)?;
        let hero = HeroIndicator::from_dom(&dom);
        let mut expand = ExpandController::from_dom(&dom);
        let carousel = CarouselController::from_dom(&mut dom, &layout)?;

        let mut effects = Effects::default();
        if let Some(expand) = expand.as_mut() {
            expand.start_media(&mut dom, autoplay_allowed, &mut effects)?;
            expand.update(&mut dom, &layout)?;
        }

        let mut page = Self {
            dom,
            layout,
            task_queue: Vec::new(),
            now_ms: 0,
            next_timer_id: 1,
            next_task_order: 0,
            delay_restore_ms: DELAY_RESTORE_MS,
            navigations: Vec::new(),
            scroll_requests: Vec::new(),
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
            nav,
            logo_shrink,
            navbar_fx,
            reveal,
            hero,
            expand,
            carousel,
        };

        effects.schedule(CATCH_UP_DELAY_MS, TimerJob::RevealCatchUp);
        page.apply_effects(effects)?;
        Ok(page)
    }

    // -- tracing -------------------------------------------------------

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    // -- configuration -------------------------------------------------

    /// Override the restore window for stripped `delay-*` classes.
    pub fn set_delay_restore_ms(&mut self, delay_ms: i64) -> Result<()> {
        if delay_ms <= 0 {
            return Err(Error::InvalidConfig(
                "set_delay_restore_ms requires a positive delay".into(),
            ));
        }
        self.delay_restore_ms = delay_ms;
        Ok(())
    }

    /// Re-time the pending reveal catch-up pass. A no-op once it has run.
    pub fn set_catch_up_delay_ms(&mut self, delay_ms: i64) -> Result<()> {
        if delay_ms <= 0 {
            return Err(Error::InvalidConfig(
                "set_catch_up_delay_ms requires a positive delay".into(),
            ));
        }
        for task in self.task_queue.iter_mut() {
            if task.job == TimerJob::RevealCatchUp {
                task.due_at = self.now_ms.saturating_add(delay_ms);
            }
        }
        Ok(())
    }

    // -- geometry ------------------------------------------------------

    /// Set an element's document rect. Geometry changes alone fire no
    /// handlers; the next scroll/resize/timer pass picks them up.
    pub fn set_rect(&mut self, selector: &str, rect: Rect) -> Result<()> {
        let target = self.select_one(selector)?;
        self.layout.set_rect(target, rect);
        Ok(())
    }

    /// Resize the viewport without dispatching a resize event.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.layout.viewport_width = width;
        self.layout.viewport_height = height;
    }

    pub fn viewport(&self) -> (f64, f64) {
        (self.layout.viewport_width, self.layout.viewport_height)
    }

    pub fn scroll_y(&self) -> f64 {
        self.layout.scroll_y
    }

    // -- input events --------------------------------------------------

    /// Dispatch a click on the first element matching `selector`.
    ///
    /// Behavior handlers run in wiring order, then the document-level
    /// outside-click handler (unless propagation was stopped), then the
    /// default link action (unless the default was prevented).
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.trace_event(format!("[event] click {selector}"));

        let mut event = EventState::new(target);
        let mut effects = Effects::default();

        self.nav
            .handle_click(&mut self.dom, &self.layout, &mut event, &mut effects)?;
        if !event.propagation_stopped {
            if let Some(hero) = &self.hero {
                hero.handle_click(&self.dom, &self.layout, &event, &mut effects);
            }
        }
        if !event.propagation_stopped {
            if let Some(carousel) = self.carousel.as_mut() {
                carousel.handle_click(&mut self.dom, &self.layout, &mut event)?;
            }
        }
        if !event.propagation_stopped {
            self.nav.handle_document_click(&mut self.dom, &event)?;
        }
        if !event.default_prevented {
            self.run_default_click_action(target, &mut effects);
        }

        self.apply_effects(effects)
    }

    /// Scroll the page to `y` and run every scroll handler.
    pub fn scroll_to(&mut self, y: f64) -> Result<()> {
        self.trace_event(format!("[scroll] y={y}"));
        self.layout.scroll_y = y.max(0.0);
        let mut effects = Effects::default();
        self.run_scroll_handlers(&mut effects)?;
        self.apply_effects(effects)
    }

    /// Resize the viewport and re-derive visibility state, the way
    /// intersection observers react to geometry changes.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        self.trace_event(format!("[resize] {width}x{height}"));
        self.layout.viewport_width = width;
        self.layout.viewport_height = height;
        let mut effects = Effects::default();
        self.reveal
            .evaluate(&mut self.dom, &self.layout, self.delay_restore_ms, &mut effects)?;
        self.apply_effects(effects)
    }

    // -- virtual clock -------------------------------------------------

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut pending: Vec<PendingTimer> = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                job: task.job.label(),
            })
            .collect();
        pending.sort_by_key(|timer| (timer.due_at, timer.id));
        pending
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        let target = self.now_ms.saturating_add(delta_ms.max(0));
        self.advance_time_to(target)
    }

    /// Run every task due up to `target_ms` in (due time, schedule order),
    /// then settle the clock at `target_ms`.
    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        loop {
            let mut best: Option<usize> = None;
            for (position, task) in self.task_queue.iter().enumerate() {
                if task.due_at > target_ms {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some(current) => {
                        let incumbent = &self.task_queue[current];
                        (task.due_at, task.order) < (incumbent.due_at, incumbent.order)
                    }
                };
                if better {
                    best = Some(position);
                }
            }
            let Some(position) = best else {
                break;
            };
            let task = self.task_queue.remove(position);
            self.now_ms = self.now_ms.max(task.due_at);
            self.trace_timer(format!("[timer] run id={} job={}", task.id, task.job.label()));
            self.run_timer_job(task.job)?;
        }
        self.now_ms = self.now_ms.max(target_ms);
        Ok(())
    }

    /// Run everything pending, however far in the future.
    pub fn flush(&mut self) -> Result<()> {
        let Some(last_due) = self.task_queue.iter().map(|task| task.due_at).max() else {
            return Ok(());
        };
        self.advance_time_to(last_due)
    }

    // -- carousel operations -------------------------------------------

    pub fn active_slide_index(&self) -> Result<usize> {
        self.carousel
            .as_ref()
            .map(CarouselController::active_index)
            .ok_or(Error::NoCarousel)
    }

    pub fn slide_count(&self) -> Result<usize> {
        self.carousel
            .as_ref()
            .map(CarouselController::slide_count)
            .ok_or(Error::NoCarousel)
    }

    pub fn carousel_next(&mut self) -> Result<()> {
        let Some(carousel) = self.carousel.as_mut() else {
            return Err(Error::NoCarousel);
        };
        carousel.next(&mut self.dom, &self.layout)
    }

    pub fn carousel_prev(&mut self) -> Result<()> {
        let Some(carousel) = self.carousel.as_mut() else {
            return Err(Error::NoCarousel);
        };
        carousel.prev(&mut self.dom, &self.layout)
    }

    /// Jump to a slide by index. Unlike the internal wiring, this public
    /// entry point checks the range and reports a violation explicitly.
    pub fn carousel_show(&mut self, index: usize) -> Result<()> {
        let Some(carousel) = self.carousel.as_mut() else {
            return Err(Error::NoCarousel);
        };
        let count = carousel.slide_count();
        if index >= count {
            return Err(Error::SlideIndexOutOfRange { index, count });
        }
        carousel.show_slide(&mut self.dom, &self.layout, index)
    }

    // -- recorded outcomes ---------------------------------------------

    /// Whether the expand section's media element is playing (false when
    /// autoplay was blocked or the effect is absent).
    pub fn media_playing(&self) -> bool {
        self.expand
            .as_ref()
            .is_some_and(ExpandController::is_media_playing)
    }

    /// Hrefs of links whose default action ran (no anchor target on page).
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Smooth-scroll requests issued by handlers, oldest first.
    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }

    // -- queries & assertions ------------------------------------------

    pub fn class_contains(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.class_contains(target, class_name)
    }

    pub fn class_names(&self, selector: &str) -> Result<Vec<String>> {
        let target = self.select_one(selector)?;
        self.dom.class_names(target)
    }

    pub fn style_value(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.style_get(target, property)
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(|_| ())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.class_contains(target, class_name)? {
            return Ok(());
        }
        Err(self.assertion_failure(selector, target, format!("class `{class_name}`")))
    }

    pub fn assert_no_class(&self, selector: &str, class_name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if !self.dom.class_contains(target, class_name)? {
            return Ok(());
        }
        Err(self.assertion_failure(selector, target, format!("no class `{class_name}`")))
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.style_get(target, property)?;
        if actual == expected {
            return Ok(());
        }
        Err(Error::AssertionFailed {
            selector: selector.to_string(),
            expected: format!("{property}: {expected}"),
            actual: format!("{property}: {actual}"),
            dom_snippet: self.dom.dump_start_tag(target),
        })
    }

    fn assertion_failure(&self, selector: &str, target: NodeId, expected: String) -> Error {
        Error::AssertionFailed {
            selector: selector.to_string(),
            expected,
            actual: self.dom.attr(target, "class").unwrap_or_default(),
            dom_snippet: self.dom.dump_start_tag(target),
        }
    }

    // -- internals -----------------------------------------------------

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn run_scroll_handlers(&mut self, effects: &mut Effects) -> Result<()> {
        if let Some(logo_shrink) = &self.logo_shrink {
            logo_shrink.handle_scroll(&mut self.dom, &self.layout)?;
        }
        if let Some(navbar_fx) = &self.navbar_fx {
            navbar_fx.handle_scroll(&mut self.dom, &self.layout)?;
        }
        self.reveal
            .evaluate(&mut self.dom, &self.layout, self.delay_restore_ms, effects)?;
        if let Some(hero) = &self.hero {
            hero.handle_scroll(&mut self.dom, &self.layout)?;
        }
        if let Some(expand) = &self.expand {
            expand.update(&mut self.dom, &self.layout)?;
        }
        Ok(())
    }

    fn run_default_click_action(&mut self, target: NodeId, effects: &mut Effects) {
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            if self.dom.tag_name(current) == Some("a") {
                if let Some(href) = self.dom.attr(current, "href") {
                    effects.trace(format!("[event] navigate {href}"));
                    self.navigations.push(href);
                }
                return;
            }
            cursor = self.dom.parent(current);
        }
    }

    fn run_timer_job(&mut self, job: TimerJob) -> Result<()> {
        match job {
            TimerJob::RestoreDelayClasses { node, classes } => {
                RevealController::restore_delay_classes(&mut self.dom, node, &classes)
            }
            TimerJob::RevealCatchUp => self.reveal.catch_up(&mut self.dom, &self.layout),
        }
    }

    /// Drain handler side effects: trace lines, new timers, and smooth
    /// scrolls. Applying a scroll runs the scroll handlers, which may add
    /// further effects; the loop continues until everything settles.
    fn apply_effects(&mut self, mut effects: Effects) -> Result<()> {
        loop {
            for line in effects.traces.drain(..) {
                if line.starts_with("[timer]") {
                    self.trace_timer(line);
                } else {
                    self.trace_event(line);
                }
            }
            for (delay_ms, job) in effects.timers.drain(..) {
                self.schedule_timer(delay_ms, job);
            }

            let scrolls = std::mem::take(&mut effects.scrolls);
            if scrolls.is_empty() {
                return Ok(());
            }
            for request in scrolls {
                self.layout.scroll_y = request.target_y.max(0.0);
                self.scroll_requests.push(request);
                self.run_scroll_handlers(&mut effects)?;
            }
        }
    }

    fn schedule_timer(&mut self, delay_ms: i64, job: TimerJob) {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        let due_at = self.now_ms.saturating_add(delay_ms.max(0));
        self.trace_timer(format!(
            "[timer] schedule id={id} job={} due={due_at}",
            job.label()
        ));
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            job,
        });
    }

    fn trace_event(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.push_trace(line);
        }
    }

    fn trace_timer(&mut self, line: String) {
        if self.trace && self.trace_timers {
            self.push_trace(line);
        }
    }

    fn push_trace(&mut self, line: String) {
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        self.trace_logs.push(line);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }
}
