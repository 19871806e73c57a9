//! Boot sequence and time base on a scripted scheduler

mod common;

use common::{Script, TestKernel};
use kite_kernel::{KError, Kernel, Timeout, WaitOptions};
use kite_posix::is_masked;

fn unbooted() -> &'static TestKernel {
    Box::leak(Box::new(Kernel::new(Script::default())))
}

#[test]
fn test_boot_holds_critical_section_until_start() {
    let k = unbooted();
    assert!(!k.is_started());

    let boot = k.init();
    assert!(is_masked());
    let f = boot.kernel().event_flags_create().unwrap();
    boot.kernel().event_flags_set(f, 0b1).unwrap();
    assert!(is_masked());

    boot.start();
    assert!(!is_masked());
    assert!(k.is_started());
    assert_eq!(k.event_flags_get(f), Ok(0b1));
}

#[test]
fn test_tick_counts_start_at_zero_and_grow() {
    let k = unbooted();
    assert_eq!(k.tick_count(), 0);
    assert_eq!(k.raw_ticks(), 0);

    k.init().start();
    for _ in 0..3 {
        k.tick(2);
    }
    assert_eq!(k.raw_ticks(), 3);
    assert_eq!(k.tick_count(), 6);
    assert_eq!(k.tick_count64(), 6);
}

#[test]
fn test_zero_unit_tick_leaves_timers_alone() {
    let k = common::kernel();
    let f = k.event_flags_create().unwrap();

    k.scheduler()
        .then(move || {
            for _ in 0..7 {
                k.tick(0);
            }
            assert_eq!(k.raw_ticks(), 7);
            assert_eq!(k.tick_count(), 0);
            assert_eq!(k.sleep_hint(), 2);
            assert!(k.scheduler().woken().is_empty());
            k.tick(1);
        })
        .then(move || k.tick(1));

    let woke = k.event_flags_timed_wait(f, 0b1, WaitOptions::ANY, Timeout::from_ticks(2));
    assert_eq!(woke, Err(KError::Timeout));
    assert_eq!(k.raw_ticks(), 9);
    assert_eq!(k.tick_count(), 2);
}

#[test]
fn test_tick_interrupt_uses_port_units() {
    let k = common::kernel();
    k.on_tick_interrupt();
    assert_eq!(k.raw_ticks(), 1);
    assert!(k.tick_count() <= 1);
}

#[test]
fn test_sleep_hint_tracks_nearest_timeout() {
    let k = common::kernel();
    let f = k.event_flags_create().unwrap();
    assert_eq!(k.sleep_hint(), u32::MAX);

    k.scheduler().then(move || {
        k.scheduler().then(move || {
            assert_eq!(k.sleep_hint(), 4);
            k.tick(3);
            assert_eq!(k.sleep_hint(), 1);
            k.event_flags_set(f, 0b11).unwrap();
        });
        let woke = k.event_flags_timed_wait(f, 0b10, WaitOptions::ANY, Timeout::from_ticks(4));
        assert_eq!(woke, Ok(0b10));
    });
    let woke = k.event_flags_timed_wait(f, 0b01, WaitOptions::ANY, Timeout::from_ticks(9));
    assert_eq!(woke, Ok(0b01));
    assert_eq!(k.sleep_hint(), u32::MAX);
}

#[test]
fn test_idle_without_ticks_adds_no_idle_time() {
    let k = common::kernel();
    k.idle_once();
    assert_eq!(k.idle_time(), 0);
}
