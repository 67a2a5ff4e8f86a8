use page_motion::{
    EXPAND_MAX_SCALE, EXPAND_MIN_SCALE, OVERLAY_MAX_HEIGHT_PCT, Rect, expand_scale,
    overlay_height_percent, section_progress,
};
use proptest::prelude::*;
use proptest::test_runner::FileFailurePersistence;

const PROGRESS_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/progress_property_fuzz_test.txt";
const DEFAULT_PROGRESS_PROPTEST_CASES: u32 = 256;

fn progress_proptest_cases() -> u32 {
    std::env::var("PAGE_MOTION_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PROGRESS_PROPTEST_CASES)
}

fn ratio_strategy() -> BoxedStrategy<f64> {
    (0.0..=1.0f64).boxed()
}

fn section_strategy() -> BoxedStrategy<(f64, f64, f64)> {
    // (top, height, viewport height)
    (-6000.0..6000.0f64, 1.0..5000.0f64, 100.0..2000.0f64).boxed()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: progress_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(PROGRESS_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn scale_is_the_documented_line(r in ratio_strategy()) {
        let scale = expand_scale(r);
        prop_assert!((scale - (0.1 + 0.9 * r)).abs() < 1e-12);
        prop_assert!((EXPAND_MIN_SCALE..=EXPAND_MAX_SCALE).contains(&scale));
    }

    #[test]
    fn scale_is_monotone(a in ratio_strategy(), b in ratio_strategy()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(expand_scale(lo) <= expand_scale(hi));
    }

    #[test]
    fn overlay_is_flat_then_linear(r in ratio_strategy()) {
        let height = overlay_height_percent(r);
        if r < 0.5 {
            prop_assert_eq!(height, 0.0);
        } else {
            let expected = OVERLAY_MAX_HEIGHT_PCT * (r - 0.5) / 0.5;
            prop_assert!((height - expected).abs() < 1e-9);
        }
        prop_assert!((0.0..=OVERLAY_MAX_HEIGHT_PCT).contains(&height));
    }

    #[test]
    fn progress_stays_normalized((top, height, viewport) in section_strategy()) {
        let progress = section_progress(Rect::new(top, 0.0, 400.0, height), viewport);
        prop_assert!((0.0..=1.0).contains(&progress));
    }

    #[test]
    fn progress_never_decreases_while_scrolling_down(
        (top, height, viewport) in section_strategy(),
        delta in 0.0..3000.0f64,
    ) {
        // Scrolling down moves the section's viewport-relative top up.
        let before = section_progress(Rect::new(top, 0.0, 400.0, height), viewport);
        let after = section_progress(Rect::new(top - delta, 0.0, 400.0, height), viewport);
        prop_assert!(
            after >= before,
            "progress regressed: top={top} height={height} viewport={viewport} delta={delta} before={before} after={after}"
        );
    }
}
