//! Event Flags on Linux (POSIX)
//!
//! Three sensor threads publish one bit each of an event flags object when a
//! sample is ready, at different rates. The main thread fuses samples by
//! waiting for all three bits with auto-reset, so a round always consumes
//! the latest sample of every sensor. A watchdog thread waits for the fusion
//! heartbeat with a timeout and reports stalls.
//!
//! Run with `RUST_LOG=debug` to see the kernel's own log output.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use kite_posix::{
    register_tick_handler, stop_ticker, EventFlags, KError, KResult, Kernel, PosixPort,
    ThreadScheduler, Timeout, WaitOptions,
};
use log::{error, info, warn};

static KERNEL: Kernel<PosixPort, ThreadScheduler> = Kernel::new(ThreadScheduler::new());

const SENSOR_BITS: [u32; 3] = [0b001, 0b010, 0b100];
const ALL_SENSORS: u32 = 0b111;
const HEARTBEAT: u32 = 1 << 8;

const ROUNDS: u32 = 20;
const WATCHDOG_MS: u32 = 250;

static DONE: AtomicBool = AtomicBool::new(false);

fn sensor(flags: EventFlags, index: usize, period: Duration) {
    let bit = SENSOR_BITS[index];
    while !DONE.load(Ordering::Relaxed) {
        thread::sleep(period);
        if let Err(err) = KERNEL.event_flags_set(flags, bit) {
            error!("sensor {} failed to publish: {}", index, err);
            return;
        }
    }
}

fn fusion(samples: EventFlags, heartbeat: EventFlags) -> KResult<u32> {
    let mut rounds = 0;
    while rounds < ROUNDS {
        let bits = KERNEL.event_flags_wait(samples, ALL_SENSORS, WaitOptions::ALL.auto_reset())?;
        rounds += 1;
        info!("round {:2}: fused {:#05b} at {} ms", rounds, bits, KERNEL.tick_count());
        KERNEL.event_flags_set(heartbeat, HEARTBEAT)?;
    }
    Ok(rounds)
}

fn watchdog(heartbeat: EventFlags) {
    let mut beats = 0;
    while !DONE.load(Ordering::Relaxed) {
        let timeout = Timeout::from_ticks(WATCHDOG_MS);
        let take = WaitOptions::ANY.auto_reset();
        match KERNEL.event_flags_timed_wait(heartbeat, HEARTBEAT, take, timeout) {
            Ok(_) => beats += 1,
            Err(KError::Timeout) => warn!("no heartbeat for {} ms", WATCHDOG_MS),
            Err(err) => {
                error!("watchdog wait failed: {}", err);
                return;
            }
        }
    }
    info!("watchdog saw {} heartbeats", beats);
}

fn run() -> Result<(), KError> {
    register_tick_handler(|| KERNEL.on_tick_interrupt());

    let boot = KERNEL.init();
    let samples = boot.kernel().event_flags_create()?;
    let heartbeat = boot.kernel().event_flags_create()?;
    boot.start();

    let periods = [10, 15, 25].map(Duration::from_millis);
    let sensors: Vec<_> = periods
        .into_iter()
        .enumerate()
        .map(|(index, period)| thread::spawn(move || sensor(samples, index, period)))
        .collect();
    let dog = thread::spawn(move || watchdog(heartbeat));
    let rounds = fusion(samples, heartbeat);
    DONE.store(true, Ordering::Relaxed);
    let rounds = rounds?;

    for handle in sensors {
        let _ = handle.join();
    }
    let _ = dog.join();
    stop_ticker();

    info!(
        "{} rounds in {} ms, {} tick interrupts",
        rounds,
        KERNEL.tick_count(),
        KERNEL.raw_ticks()
    );
    KERNEL.event_flags_delete(samples)?;
    KERNEL.event_flags_delete(heartbeat)?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("demo failed: {}", err);
        process::exit(1);
    }
}
