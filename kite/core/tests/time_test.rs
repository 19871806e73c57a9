//! Time tests for kite-core

use kite_core::{Tick, TickScaler, Timeout};

#[test]
fn test_tick_advance() {
    let mut tick = Tick::ZERO;
    tick.advance(2);
    tick.advance(2);
    assert_eq!(tick.raw(), 4);
    assert_eq!(tick.elapsed_since(Tick::new(1)), 3);
}

#[test]
fn test_tick_low_word() {
    let tick = Tick::new(0x1_0000_0005);
    assert_eq!(tick.low(), 5);
}

#[test]
fn test_timeout_conversion() {
    assert_eq!(Timeout::from(0), Timeout::ZERO);
    assert_eq!(Timeout::from(25), Timeout::Ticks(25));
    assert_eq!(Timeout::from(u32::MAX), Timeout::INFINITE);
    assert!(Timeout::ZERO.is_zero());
    assert_eq!(Timeout::INFINITE.ticks(), None);
}

#[test]
fn test_scaler_millisecond_compatible() {
    // 10 kHz SysTick: every tenth interrupt completes a millisecond
    let mut scaler = TickScaler::new(10_000);
    assert_eq!(scaler.tick_hz(), 10_000);
    let per_interrupt: Vec<u32> = (0..20).map(|_| scaler.advance(1)).collect();
    assert_eq!(per_interrupt.iter().sum::<u32>(), 2);
    assert_eq!(per_interrupt[9], 1);
    assert_eq!(per_interrupt[19], 1);
}
