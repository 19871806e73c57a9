//! Clock tick service for POSIX
//!
//! A dedicated thread stands in for the tick timer interrupt. It calls the
//! registered handler at a fixed rate, sleeping until absolute deadlines so
//! the tick does not drift.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use kite_kernel::TickScaler;
use log::{debug, warn};
use parking_lot::{const_mutex, Mutex};

/// Default tick rate in Hz
pub const DEFAULT_TICKS_PER_SEC: u32 = 1000;

/// Highest supported tick rate in Hz
pub const MAX_TICKS_PER_SEC: u32 = 10_000;

const NSEC_PER_SEC: u64 = 1_000_000_000;

static TICKER_RUNNING: AtomicBool = AtomicBool::new(false);
static TICK_RATE_HZ: AtomicU32 = AtomicU32::new(DEFAULT_TICKS_PER_SEC);
static TICKER_THREAD: Mutex<Option<JoinHandle<()>>> = const_mutex(None);
static TICK_HANDLER: Mutex<Option<TickHandler>> = const_mutex(None);
static SCALER: Mutex<TickScaler> = const_mutex(TickScaler::new(DEFAULT_TICKS_PER_SEC));

/// Tick interrupt handler, normally `|| KERNEL.on_tick_interrupt()`
pub type TickHandler = fn();

/// Clock tick configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    rate_hz: u32,
}

impl ClockTick {
    /// Create a new clock tick configuration
    pub fn new(rate_hz: u32) -> Self {
        assert!(rate_hz > 0, "tick rate must be greater than 0");
        ClockTick { rate_hz }
    }

    /// Tick rate in Hz
    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// Get the tick period as a Duration
    pub fn period(&self) -> Duration {
        Duration::from_nanos(NSEC_PER_SEC / self.rate_hz as u64)
    }
}

/// Set the rate of the simulated tick interrupt
///
/// Takes effect the next time the ticker is started.
///
/// # Panics
///
/// Panics if `ticks_per_sec` is zero or above [`MAX_TICKS_PER_SEC`].
pub fn set_tick_rate(ticks_per_sec: u32) {
    assert!(ticks_per_sec > 0, "tick rate must be greater than 0");
    assert!(ticks_per_sec <= MAX_TICKS_PER_SEC, "tick rate too high (max 10kHz)");

    TICK_RATE_HZ.store(ticks_per_sec, Ordering::SeqCst);
    *SCALER.lock() = TickScaler::new(ticks_per_sec);
}

/// Current tick rate in Hz
pub fn tick_rate() -> u32 {
    TICK_RATE_HZ.load(Ordering::SeqCst)
}

/// Register the handler the ticker calls on every tick
pub fn register_tick_handler(handler: TickHandler) {
    *TICK_HANDLER.lock() = Some(handler);
}

/// Time units represented by one tick at the current rate
///
/// Rates above 1 kHz carry the fractional millisecond between ticks.
pub(crate) fn acknowledge() -> u32 {
    SCALER.lock().advance(1)
}

/// Start the ticker thread
///
/// Does nothing if no handler is registered or the ticker already runs.
pub fn start_ticker() {
    if TICK_HANDLER.lock().is_none() {
        debug!("no tick handler registered, ticker not started");
        return;
    }
    if TICKER_RUNNING.swap(true, Ordering::SeqCst) {
        return;
    }

    let tick = ClockTick::new(tick_rate());
    let spawned = thread::Builder::new()
        .name("kite-ticker".into())
        .spawn(move || ticker_thread(tick.period()));
    match spawned {
        Ok(handle) => {
            debug!("ticker started at {} Hz", tick.rate_hz());
            *TICKER_THREAD.lock() = Some(handle);
        }
        Err(err) => {
            warn!("failed to spawn ticker thread: {}", err);
            TICKER_RUNNING.store(false, Ordering::SeqCst);
        }
    }
}

/// Stop the ticker thread and wait for it to finish
pub fn stop_ticker() {
    TICKER_RUNNING.store(false, Ordering::SeqCst);

    let handle = TICKER_THREAD.lock().take();
    if let Some(handle) = handle {
        let _ = handle.join();
        debug!("ticker stopped");
    }
}

/// Check if the ticker thread runs
pub fn ticker_running() -> bool {
    TICKER_RUNNING.load(Ordering::SeqCst)
}

fn ticker_thread(tick_period: Duration) {
    let mut next_tick = Instant::now();

    while TICKER_RUNNING.load(Ordering::Relaxed) {
        next_tick += tick_period;

        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        }

        let handler = *TICK_HANDLER.lock();
        if let Some(handler) = handler {
            handler();
        }
    }
}
