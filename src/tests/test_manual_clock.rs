use std::sync::Arc;

use parking_lot::Mutex;

use crate::{ManualClock, TimerFacility};

use super::harness::ms;

fn log_into(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> crate::TimerTask {
    let log = log.clone();
    Box::new(move || log.lock().push(name))
}

#[test]
fn fires_in_deadline_then_schedule_order() {
    let clock = ManualClock::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let _ = clock.schedule(ms(30), log_into(&log, "c"));
    let _ = clock.schedule(ms(10), log_into(&log, "a"));
    let _ = clock.schedule(ms(10), log_into(&log, "b"));

    assert_eq!(clock.advance(ms(30)), 3);
    assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    assert_eq!(clock.now(), ms(30));
}

#[test]
fn does_not_fire_before_deadline() {
    let clock = ManualClock::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let _ = clock.schedule(ms(10), log_into(&log, "a"));

    assert_eq!(clock.advance(ms(9)), 0);
    assert_eq!(clock.pending_timers(), 1);
    assert_eq!(clock.advance(ms(1)), 1);
    assert_eq!(*log.lock(), vec!["a"]);
}

#[test]
fn cancelled_task_never_runs() {
    let clock = ManualClock::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let handle = clock.schedule(ms(10), log_into(&log, "a"));
    handle.cancel();

    assert_eq!(clock.pending_timers(), 0);
    assert_eq!(clock.advance(ms(100)), 0);
    assert!(log.lock().is_empty());
}

#[test]
fn tasks_scheduled_while_advancing_fire_in_the_same_advance() {
    let clock = ManualClock::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let inner_clock = clock.clone();
    let inner_log = log.clone();
    let _ = clock.schedule(
        ms(10),
        Box::new(move || {
            inner_log.lock().push("outer");
            let _ = inner_clock.schedule(ms(5), log_into(&inner_log, "inner"));
        }),
    );

    assert_eq!(clock.advance(ms(15)), 2);
    assert_eq!(*log.lock(), vec!["outer", "inner"]);
}

#[test]
fn cancel_after_clock_is_gone_is_harmless() {
    let clock = ManualClock::new();
    let handle = clock.schedule(ms(10), Box::new(|| {}));
    drop(clock);

    handle.cancel();
}
