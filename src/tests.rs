use crate::geometry::Rect;
use crate::progress::{expand_scale, overlay_height_percent, section_progress};
use crate::{Error, Page, Result};

// ---------------------------------------------------------------------
// progress math
// ---------------------------------------------------------------------

#[test]
fn progress_is_zero_before_the_section_is_reached() {
    let rect = Rect::new(900.0, 0.0, 400.0, 1000.0);
    assert_eq!(section_progress(rect, 800.0), 0.0);
}

#[test]
fn progress_is_one_after_the_section_has_fully_passed() {
    let rect = Rect::new(-1200.0, 0.0, 400.0, 1000.0);
    assert_eq!(section_progress(rect, 800.0), 1.0);
}

#[test]
fn progress_matches_the_worked_example() {
    // Section height 1000, viewport 800, top at 400: scrolled-into
    // distance 400, so progress 0.4, scale 0.46, overlay still flat.
    let rect = Rect::new(400.0, 0.0, 400.0, 1000.0);
    let progress = section_progress(rect, 800.0);
    assert_eq!(progress, 0.4);
    assert!((expand_scale(progress) - 0.46).abs() < 1e-12);
    assert_eq!(overlay_height_percent(progress), 0.0);
}

#[test]
fn scale_spans_ten_to_one_hundred_percent() {
    assert_eq!(expand_scale(0.0), 0.1);
    assert_eq!(expand_scale(1.0), 1.0);
}

#[test]
fn overlay_rises_over_the_second_half_only() {
    assert_eq!(overlay_height_percent(0.0), 0.0);
    assert_eq!(overlay_height_percent(0.49), 0.0);
    assert_eq!(overlay_height_percent(0.5), 0.0);
    assert_eq!(overlay_height_percent(0.75), 15.0);
    assert_eq!(overlay_height_percent(1.0), 30.0);
}

// ---------------------------------------------------------------------
// navigation menu
// ---------------------------------------------------------------------

const NAV_HTML: &str = r##"
    <nav class="navbar" data-rect="0 0 1280 80">
      <a class="nav-logo" href="/">home</a>
      <button id="navToggle">menu</button>
      <ul id="navMenu">
        <li class="nav-item">
          <a id="productsLink" class="nav-link has-dropdown" href="#">products</a>
          <ul class="dropdown">
            <li class="dropdown-item"><a id="firstProduct" href="/products/alpha">alpha</a></li>
          </ul>
        </li>
        <li class="nav-item">
          <a id="pricingLink" class="nav-link has-dropdown" href="#">pricing</a>
          <ul class="dropdown">
            <li class="dropdown-item"><a href="/pricing/teams">teams</a></li>
          </ul>
        </li>
        <li class="nav-item">
          <a id="aboutLink" class="nav-link" href="/about">about</a>
        </li>
        <li class="nav-item">
          <a id="contactLink" class="nav-link" href="#contact">contact</a>
        </li>
      </ul>
    </nav>
    <main>
      <section id="contact" data-rect="2000 0 1280 600">contact us</section>
      <p id="outside">outside the navbar</p>
    </main>
    "##;

fn mobile(html: &str) -> String {
    html.replace("<nav class=\"navbar\"", "<nav class=\"navbar\" data-viewport=\"375 700\"")
}

#[test]
fn toggle_click_opens_and_closes_the_menu() -> Result<()> {
    let mut page = Page::from_html(NAV_HTML)?;
    page.click("#navToggle")?;
    page.assert_class("#navToggle", "active")?;
    page.assert_class("#navMenu", "active")?;

    page.click("#navToggle")?;
    page.assert_no_class("#navToggle", "active")?;
    page.assert_no_class("#navMenu", "active")?;
    Ok(())
}

#[test]
fn mobile_dropdown_toggles_and_closes_its_siblings() -> Result<()> {
    let mut page = Page::from_html(&mobile(NAV_HTML))?;

    page.click("#productsLink")?;
    page.assert_class("#productsLink", "active")?;

    // Opening the second dropdown force-closes the first.
    page.click("#pricingLink")?;
    page.assert_class("#pricingLink", "active")?;
    page.assert_no_class("#productsLink", "active")?;

    // A dropdown toggle never counts as a page navigation.
    assert!(page.navigations().is_empty());
    Ok(())
}

#[test]
fn mobile_dropdown_click_marks_link_panel_and_parent() -> Result<()> {
    let mut page = Page::from_html(&mobile(NAV_HTML))?;
    page.click("#productsLink")?;
    page.assert_class("#productsLink", "active")?;
    let class_names = page.class_names("#navMenu li")?;
    assert!(class_names.contains(&"active".to_string()), "parent item: {class_names:?}");
    Ok(())
}

#[test]
fn desktop_dropdown_link_is_a_plain_navigation() -> Result<()> {
    let mut page = Page::from_html(NAV_HTML)?;
    page.click("#productsLink")?;
    page.assert_no_class("#productsLink", "active")?;
    assert_eq!(page.navigations(), ["#"]);
    Ok(())
}

#[test]
fn plain_link_click_closes_the_mobile_menu() -> Result<()> {
    let mut page = Page::from_html(&mobile(NAV_HTML))?;
    page.click("#navToggle")?;
    page.assert_class("#navMenu", "active")?;

    page.click("#aboutLink")?;
    page.assert_no_class("#navMenu", "active")?;
    page.assert_no_class("#navToggle", "active")?;
    assert_eq!(page.navigations(), ["/about"]);
    Ok(())
}

#[test]
fn dropdown_item_click_closes_the_mobile_menu() -> Result<()> {
    let mut page = Page::from_html(&mobile(NAV_HTML))?;
    page.click("#navToggle")?;
    page.click("#productsLink")?;
    page.assert_class("#navMenu", "active")?;

    page.click("#firstProduct")?;
    page.assert_no_class("#navMenu", "active")?;
    Ok(())
}

#[test]
fn outside_click_closes_the_menu_and_open_dropdowns() -> Result<()> {
    let mut page = Page::from_html(&mobile(NAV_HTML))?;
    page.click("#navToggle")?;
    page.click("#productsLink")?;

    page.click("#outside")?;
    page.assert_no_class("#navMenu", "active")?;
    page.assert_no_class("#navToggle", "active")?;
    page.assert_no_class("#productsLink", "active")?;
    Ok(())
}

#[test]
fn anchor_click_smooth_scrolls_below_the_navbar() -> Result<()> {
    let mut page = Page::from_html(NAV_HTML)?;
    page.click("#contactLink")?;

    // Target top 2000 minus navbar height 80.
    let requests = page.scroll_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target_y, 1920.0);
    assert_eq!(requests[0].behavior, "smooth");
    assert_eq!(page.scroll_y(), 1920.0);
    // The smooth scroll replaced the default jump.
    assert!(page.navigations().is_empty());
    Ok(())
}

// ---------------------------------------------------------------------
// navbar scroll effects
// ---------------------------------------------------------------------

const HERO_NAV_HTML: &str = r#"
    <nav class="navbar" data-rect="0 0 1280 80">
      <a class="nav-logo" href="/">logo</a>
    </nav>
    <section id="hero" data-rect="0 0 1280 900">hero</section>
    "#;

#[test]
fn logo_shrinks_past_the_hero_on_desktop() -> Result<()> {
    let mut page = Page::from_html(HERO_NAV_HTML)?;

    // Trigger sits at hero height minus navbar height: 820.
    page.scroll_to(820.0)?;
    page.assert_no_class(".nav-logo", "shrink")?;
    page.scroll_to(821.0)?;
    page.assert_class(".nav-logo", "shrink")?;
    page.scroll_to(400.0)?;
    page.assert_no_class(".nav-logo", "shrink")?;
    Ok(())
}

#[test]
fn logo_resets_when_the_viewport_drops_below_desktop() -> Result<()> {
    let mut page = Page::from_html(HERO_NAV_HTML)?;
    page.scroll_to(900.0)?;
    page.assert_class(".nav-logo", "shrink")?;

    page.resize(800.0, 600.0)?;
    page.scroll_to(901.0)?;
    page.assert_no_class(".nav-logo", "shrink")?;
    Ok(())
}

#[test]
fn navbar_takes_scrolled_treatment_past_half_the_hero() -> Result<()> {
    let mut page = Page::from_html(HERO_NAV_HTML)?;
    page.scroll_to(450.0)?;
    page.assert_no_class(".navbar", "scrolled")?;
    page.scroll_to(451.0)?;
    page.assert_class(".navbar", "scrolled")?;
    page.scroll_to(0.0)?;
    page.assert_no_class(".navbar", "scrolled")?;
    Ok(())
}

// ---------------------------------------------------------------------
// reveal animations
// ---------------------------------------------------------------------

const REVEAL_HTML: &str = r#"
    <section id="early" class="animate" data-rect="100 0 400 300">early</section>
    <section id="late" class="animate" data-rect="1200 0 400 300">late</section>
    <section id="cycle" class="animate-repeat delay-200" data-rect="2400 0 400 300">cycle</section>
    "#;

#[test]
fn one_shot_reveal_fires_once_and_sticks() -> Result<()> {
    let mut page = Page::from_html(REVEAL_HTML)?;
    page.assert_no_class("#late", "visible")?;

    page.scroll_to(700.0)?;
    page.assert_class("#late", "visible")?;

    // Scrolling away never takes a one-shot reveal back.
    page.scroll_to(5000.0)?;
    page.assert_class("#late", "visible")?;
    page.scroll_to(0.0)?;
    page.assert_class("#late", "visible")?;
    Ok(())
}

#[test]
fn repeating_reveal_resets_on_full_exit_and_restores_delay_classes() -> Result<()> {
    let mut page = Page::from_html(REVEAL_HTML)?;

    page.scroll_to(2100.0)?;
    page.assert_class("#cycle", "visible")?;
    page.assert_class("#cycle", "delay-200")?;

    // Full exit: the reveal class drops synchronously and the delay class
    // disappears for the restore window.
    page.scroll_to(0.0)?;
    page.assert_no_class("#cycle", "visible")?;
    page.assert_no_class("#cycle", "delay-200")?;

    let pending = page.pending_timers();
    assert_eq!(pending.len(), 2, "restore + catch-up: {pending:?}");
    assert!(pending.iter().any(|timer| timer.job == "delay_restore"));

    page.advance_time(50)?;
    page.assert_class("#cycle", "delay-200")?;
    page.assert_no_class("#cycle", "visible")?;

    // The next entrance reveals again with the delay class in place.
    page.scroll_to(2100.0)?;
    page.assert_class("#cycle", "visible")?;
    page.assert_class("#cycle", "delay-200")?;
    Ok(())
}

#[test]
fn catch_up_pass_reveals_elements_already_in_view() -> Result<()> {
    let mut page = Page::from_html(REVEAL_HTML)?;
    page.assert_no_class("#early", "visible")?;

    let pending = page.pending_timers();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].job, "reveal_catch_up");
    assert_eq!(pending[0].due_at, 100);

    page.advance_time(100)?;
    page.assert_class("#early", "visible")?;
    // Off-screen elements stay hidden.
    page.assert_no_class("#late", "visible")?;
    page.assert_no_class("#cycle", "visible")?;
    Ok(())
}

#[test]
fn delay_restore_window_is_configurable() -> Result<()> {
    let mut page = Page::from_html(REVEAL_HTML)?;
    page.set_delay_restore_ms(500)?;

    page.scroll_to(2100.0)?;
    page.scroll_to(0.0)?;
    page.advance_time(499)?;
    page.assert_no_class("#cycle", "delay-200")?;
    page.advance_time(1)?;
    page.assert_class("#cycle", "delay-200")?;
    Ok(())
}

// ---------------------------------------------------------------------
// hero indicator and media expand
// ---------------------------------------------------------------------

const EXPAND_HTML: &str = r#"
    <section id="hero" data-rect="0 0 1280 800">
      <div id="scrollHint" data-rect="600 590 100 100">scroll</div>
    </section>
    <section id="mediaExpand" data-rect="800 0 1280 1000">
      <div id="mediaExpandBg"></div>
      <div id="mediaExpandOverlay"></div>
      <video id="mediaExpandVideo"></video>
    </section>
    "#;

#[test]
fn hero_indicator_scrolls_to_the_expand_section() -> Result<()> {
    let mut page = Page::from_html(EXPAND_HTML)?;
    page.click("#scrollHint")?;
    assert_eq!(page.scroll_y(), 800.0);
    assert_eq!(page.scroll_requests().len(), 1);
    Ok(())
}

#[test]
fn hero_indicator_fades_past_the_threshold() -> Result<()> {
    let mut page = Page::from_html(EXPAND_HTML)?;
    page.scroll_to(101.0)?;
    page.assert_style("#scrollHint", "opacity", "0")?;
    page.assert_style("#scrollHint", "pointer-events", "none")?;

    page.scroll_to(50.0)?;
    page.assert_style("#scrollHint", "opacity", "1")?;
    page.assert_style("#scrollHint", "pointer-events", "auto")?;
    Ok(())
}

#[test]
fn expand_effect_scales_with_scroll_progress() -> Result<()> {
    let mut page = Page::from_html(EXPAND_HTML)?;
    // Initial update at progress 0.
    page.assert_style("#mediaExpandBg", "transform", "scale(0.1)")?;

    page.scroll_to(400.0)?;
    page.assert_style("#mediaExpandBg", "transform", "scale(0.46)")?;
    page.assert_style("#mediaExpandOverlay", "height", "0%")?;

    page.scroll_to(750.0)?;
    page.assert_style("#mediaExpandBg", "transform", "scale(0.775)")?;
    page.assert_style("#mediaExpandOverlay", "height", "15%")?;

    page.scroll_to(1800.0)?;
    page.assert_style("#mediaExpandBg", "transform", "scale(1)")?;
    page.assert_style("#mediaExpandOverlay", "height", "30%")?;
    Ok(())
}

#[test]
fn media_autoplays_muted_by_default() -> Result<()> {
    let page = Page::from_html(EXPAND_HTML)?;
    assert!(page.media_playing());
    Ok(())
}

#[test]
fn blocked_autoplay_is_swallowed() -> Result<()> {
    let html = EXPAND_HTML.replace(
        "<video id=\"mediaExpandVideo\">",
        "<video id=\"mediaExpandVideo\" data-autoplay=\"blocked\">",
    );
    let mut page = Page::from_html(&html)?;
    assert!(!page.media_playing());
    // Everything else keeps working.
    page.scroll_to(400.0)?;
    page.assert_style("#mediaExpandBg", "transform", "scale(0.46)")?;
    Ok(())
}

#[test]
fn overlay_gate_leaves_mobile_overlay_untouched() -> Result<()> {
    let html = EXPAND_HTML.replace(
        "<section id=\"mediaExpand\"",
        "<section id=\"mediaExpand\" data-overlay-desktop-only data-viewport=\"375 700\"",
    );
    let mut page = Page::from_html(&html)?;
    page.scroll_to(750.0)?;
    // Background still scales; the overlay keeps its default height.
    assert_ne!(page.style_value("#mediaExpandBg", "transform")?, "");
    page.assert_style("#mediaExpandOverlay", "height", "")?;
    Ok(())
}

// ---------------------------------------------------------------------
// carousel
// ---------------------------------------------------------------------

const SLIDER_HTML: &str = r#"
    <div class="slider">
      <div class="slider-bg"></div>
      <div class="slider-overlay"></div>
      <div id="slide0" class="slide" data-background="alps.jpg">
        <button id="arrow0" class="detail-arrow">more</button>
      </div>
      <div id="slide1" class="slide" data-background="coast.jpg">
        <button id="arrow1" class="detail-arrow">more</button>
      </div>
      <div id="slide2" class="slide" data-background="dunes.jpg"></div>
      <button id="dot0" class="slider-dot"></button>
      <button id="dot1" class="slider-dot"></button>
      <button id="dot2" class="slider-dot"></button>
      <button id="thumb0" class="slider-thumb"></button>
      <button id="thumb1" class="slider-thumb"></button>
      <button id="thumb2" class="slider-thumb"></button>
      <button id="sliderPrev" class="slider-prev">prev</button>
      <button id="sliderNext" class="slider-next">next</button>
    </div>
    "#;

#[test]
fn carousel_starts_on_the_first_slide() -> Result<()> {
    let page = Page::from_html(SLIDER_HTML)?;
    assert_eq!(page.active_slide_index()?, 0);
    page.assert_class("#slide0", "active")?;
    page.assert_class("#dot0", "active")?;
    page.assert_class("#thumb0", "active")?;
    page.assert_style(".slider-bg", "background-image", "url(alps.jpg)")?;
    Ok(())
}

#[test]
fn next_and_prev_wrap_around() -> Result<()> {
    let mut page = Page::from_html(SLIDER_HTML)?;

    page.click("#sliderNext")?;
    assert_eq!(page.active_slide_index()?, 1);
    page.assert_class("#slide1", "active")?;
    page.assert_no_class("#slide0", "active")?;

    page.click("#sliderNext")?;
    page.click("#sliderNext")?;
    assert_eq!(page.active_slide_index()?, 0);

    page.click("#sliderPrev")?;
    assert_eq!(page.active_slide_index()?, 2);
    page.assert_style(".slider-bg", "background-image", "url(dunes.jpg)")?;
    Ok(())
}

#[test]
fn dots_and_thumbnails_jump_directly() -> Result<()> {
    let mut page = Page::from_html(SLIDER_HTML)?;
    page.click("#dot2")?;
    assert_eq!(page.active_slide_index()?, 2);
    page.assert_class("#dot2", "active")?;
    page.assert_no_class("#dot0", "active")?;

    page.click("#thumb1")?;
    assert_eq!(page.active_slide_index()?, 1);
    page.assert_class("#thumb1", "active")?;
    page.assert_style(".slider-bg", "background-image", "url(coast.jpg)")?;
    Ok(())
}

#[test]
fn detail_arrow_expands_on_mobile_without_navigating() -> Result<()> {
    let html = SLIDER_HTML.replace(
        "<div class=\"slider\">",
        "<div class=\"slider\" data-viewport=\"375 700\">",
    );
    let mut page = Page::from_html(&html)?;

    page.click("#arrow0")?;
    page.assert_class("#slide0", "expanded")?;
    page.assert_class(".slider-overlay", "expanded")?;
    // Propagation stops at the arrow; the slide stays current.
    assert_eq!(page.active_slide_index()?, 0);

    page.click("#arrow0")?;
    page.assert_no_class("#slide0", "expanded")?;
    page.assert_no_class(".slider-overlay", "expanded")?;
    Ok(())
}

#[test]
fn detail_arrow_is_inert_on_desktop() -> Result<()> {
    let mut page = Page::from_html(SLIDER_HTML)?;
    page.click("#arrow0")?;
    page.assert_no_class("#slide0", "expanded")?;
    Ok(())
}

#[test]
fn changing_slides_collapses_mobile_detail_panels() -> Result<()> {
    let html = SLIDER_HTML.replace(
        "<div class=\"slider\">",
        "<div class=\"slider\" data-viewport=\"375 700\">",
    );
    let mut page = Page::from_html(&html)?;
    page.click("#arrow0")?;
    page.assert_class("#slide0", "expanded")?;

    page.click("#sliderNext")?;
    page.assert_no_class("#slide0", "expanded")?;
    page.assert_no_class(".slider-overlay", "expanded")?;
    Ok(())
}

#[test]
fn slide_without_background_image_fails_construction() {
    let html = SLIDER_HTML.replace(" data-background=\"coast.jpg\"", "");
    match Page::from_html(&html) {
        Err(Error::SlideBackgroundMissing { slide }) => assert_eq!(slide, 1),
        other => panic!("expected SlideBackgroundMissing, got: {other:?}"),
    }
}

#[test]
fn out_of_range_show_is_reported() -> Result<()> {
    let mut page = Page::from_html(SLIDER_HTML)?;
    match page.carousel_show(3) {
        Err(Error::SlideIndexOutOfRange { index: 3, count: 3 }) => {}
        other => panic!("expected SlideIndexOutOfRange, got: {other:?}"),
    }
    page.carousel_show(2)?;
    assert_eq!(page.active_slide_index()?, 2);
    Ok(())
}

#[test]
fn carousel_operations_without_a_carousel_are_reported() {
    let page = Page::from_html("<p>no slider here</p>");
    match page.and_then(|page| page.active_slide_index()) {
        Err(Error::NoCarousel) => {}
        other => panic!("expected NoCarousel, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------
// harness plumbing
// ---------------------------------------------------------------------

#[test]
fn unknown_selector_is_reported() {
    let page = Page::from_html("<p id='solo'>text</p>");
    match page.and_then(|mut page| page.click("#missing")) {
        Err(Error::SelectorNotFound(selector)) => assert_eq!(selector, "#missing"),
        other => panic!("expected SelectorNotFound, got: {other:?}"),
    }
}

#[test]
fn unsupported_selector_is_reported() {
    let page = Page::from_html("<p id='solo'>text</p>");
    match page.and_then(|page| page.class_contains("p:first-child", "x")) {
        Err(Error::UnsupportedSelector(_)) => {}
        other => panic!("expected UnsupportedSelector, got: {other:?}"),
    }
}

#[test]
fn bad_rect_attribute_is_reported() {
    match Page::from_html("<div data-rect='not numbers'></div>") {
        Err(Error::InvalidConfig(message)) => {
            assert!(message.contains("data-rect"), "message: {message}")
        }
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}

#[test]
fn trace_records_events_and_timers() -> Result<()> {
    let mut page = Page::from_html(REVEAL_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);

    page.scroll_to(2100.0)?;
    page.scroll_to(0.0)?;
    page.advance_time(50)?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| line.starts_with("[scroll] y=2100")), "{logs:?}");
    assert!(
        logs.iter()
            .any(|line| line.contains("schedule") && line.contains("delay_restore")),
        "{logs:?}"
    );
    assert!(
        logs.iter()
            .any(|line| line.contains("run") && line.contains("delay_restore")),
        "{logs:?}"
    );
    Ok(())
}

#[test]
fn clock_settles_at_the_requested_time() -> Result<()> {
    let mut page = Page::from_html("<p>empty</p>")?;
    assert_eq!(page.now_ms(), 0);
    page.advance_time(250)?;
    assert_eq!(page.now_ms(), 250);
    page.advance_time_to(200)?;
    assert_eq!(page.now_ms(), 250);
    Ok(())
}

#[test]
fn flush_runs_every_pending_timer() -> Result<()> {
    let mut page = Page::from_html(REVEAL_HTML)?;
    assert_eq!(page.pending_timers().len(), 1);
    page.flush()?;
    assert!(page.pending_timers().is_empty());
    page.assert_class("#early", "visible")?;
    Ok(())
}
