//! Domain-specific assertion macros for wpick harnesses.
//!
//! These wrap `pretty_assertions` with messages that say which picker
//! invariant was violated.

/// Assert the ids of a picker's option set, in order.
///
/// ```rust
/// assert_option_ids!(picker, [1, 2, 5]);
/// ```
#[macro_export]
macro_rules! assert_option_ids {
    ($picker:expr, [$($id:expr),* $(,)?]) => {{
        let actual: Vec<u64> = $picker
            .options()
            .iter()
            .filter_map(wpick_core::SelectOption::id)
            .collect();
        let expected: Vec<u64> = vec![$($id),*];
        pretty_assertions::assert_eq!(
            actual, expected,
            "option set ids differ (query {:?})", $picker.query()
        );
    }};
}

/// Assert that a delivery is a soft failure carrying an empty option set.
#[macro_export]
macro_rules! assert_soft_failure {
    ($delivery:expr, $pattern:pat) => {{
        let delivery: &wpick_core::Delivery = &$delivery;
        assert!(
            delivery.options.is_empty(),
            "failed delivery should be empty, got {} options",
            delivery.options.len()
        );
        match &delivery.outcome {
            wpick_core::Outcome::Failed($pattern) => {}
            other => panic!(
                "assert_soft_failure! failed: expected Failed({}), got {:?}",
                stringify!($pattern),
                other
            ),
        }
    }};
}
