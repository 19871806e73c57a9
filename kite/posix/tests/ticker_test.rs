//! Ticker thread test
//!
//! The ticker is process-wide, so this binary holds a single test.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use kite_posix::{
    register_tick_handler, set_tick_rate, start_ticker, stop_ticker, tick_rate, time, Port,
    PosixPort,
};

static TICK_COUNT: AtomicUsize = AtomicUsize::new(0);

fn on_tick() {
    TICK_COUNT.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_ticker_thread() {
    set_tick_rate(100);
    assert_eq!(tick_rate(), 100);
    assert_eq!(PosixPort::TICK_HZ, time::DEFAULT_TICKS_PER_SEC);
    register_tick_handler(on_tick);
    start_ticker();
    assert!(time::ticker_running());

    thread::sleep(Duration::from_millis(200));
    stop_ticker();
    assert!(!time::ticker_running());

    // ~20 ticks, with room for scheduling jitter on loaded hosts
    let count = TICK_COUNT.load(Ordering::SeqCst);
    assert!((10..=30).contains(&count), "expected ~20 ticks, got {}", count);

    let stopped_at = TICK_COUNT.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(TICK_COUNT.load(Ordering::SeqCst), stopped_at);
}
