use super::*;

#[test]
fn nested_sum_survives_deep_recursion() {
    fn sum_to(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { n + sum_to(n - 1) })
    }

    assert_eq!(sum_to(200_000), 200_000 * 200_001 / 2);
}

#[test]
fn passes_through_results() {
    let ok: Result<u8, String> = ensure_sufficient_stack(|| Ok(7));
    assert_eq!(ok, Ok(7));
}

#[test]
fn remaining_stack_is_reported_on_native() {
    if cfg!(not(target_arch = "wasm32")) {
        assert!(remaining_stack().is_some_and(|n| n > 0));
    }
}
