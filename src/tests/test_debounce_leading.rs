use crate::DebouncePolicy;

use super::harness::{ms, recording};

#[test]
fn leading_call_invokes_synchronously_and_returns_result() {
    let (clock, recorder, debounced) =
        recording(DebouncePolicy::new(ms(100)).leading(true).trailing(false));

    assert_eq!(debounced.call(3), Some(3));
    assert_eq!(recorder.calls(), vec![(ms(0), 3)]);
    assert!(!debounced.is_pending());

    clock.advance(ms(500));
    assert_eq!(recorder.count(), 1);
}

#[test]
fn leading_only_burst_invokes_once() {
    let (clock, recorder, debounced) =
        recording(DebouncePolicy::new(ms(100)).leading(true).trailing(false));

    debounced.call(1);
    debounced.call(2);
    clock.advance(ms(50));
    assert_eq!(debounced.call(3), None);

    clock.advance(ms(1_000));
    assert_eq!(recorder.values(), vec![1]);
}

#[test]
fn leading_edge_reopens_after_quiet_period() {
    let (clock, recorder, debounced) =
        recording(DebouncePolicy::new(ms(100)).leading(true).trailing(false));

    assert_eq!(debounced.call(1), Some(1));
    clock.advance(ms(100));
    assert_eq!(debounced.call(2), Some(2));

    assert_eq!(recorder.calls(), vec![(ms(0), 1), (ms(100), 2)]);
}

#[test]
fn leading_and_trailing_single_call_invokes_once() {
    let (clock, recorder, debounced) =
        recording(DebouncePolicy::new(ms(100)).leading(true));

    assert_eq!(debounced.call(1), Some(1));
    clock.advance(ms(200));

    assert_eq!(recorder.values(), vec![1]);
}

#[test]
fn leading_and_trailing_burst_invokes_both_edges() {
    let (clock, recorder, debounced) =
        recording(DebouncePolicy::new(ms(100)).leading(true));

    debounced.call(1);
    clock.advance(ms(30));
    debounced.call(2);
    clock.advance(ms(30));
    debounced.call(3);
    clock.advance(ms(100));

    assert_eq!(recorder.calls(), vec![(ms(0), 1), (ms(160), 3)]);
}

#[test]
fn leading_calls_spaced_at_least_wait_apart_each_invoke_synchronously() {
    let (clock, recorder, debounced) =
        recording(DebouncePolicy::new(ms(100)).leading(true));

    for i in 0..4 {
        assert_eq!(debounced.call(i), Some(i));
        clock.advance(ms(100));
    }

    assert_eq!(recorder.values(), vec![0, 1, 2, 3]);
}
